//! Lagrange-point transfer: circular-approximation ephemerides for the
//! Earth-Moon and Sun-Earth systems, then a Lambert solve to the L-point
//! position at arrival.

use crate::common::ManeuverResult;
use crate::lambert;
use arenasim_core::constants::{AU_M, MU_EARTH};
use arenasim_core::types::{Position, Velocity};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagrangeSystem {
    EarthMoon,
    SunEarth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagrangePoint {
    L1,
    L2,
    L3,
    L4,
    L5,
}

const MOON_ORBIT_RADIUS_M: f64 = 384_400_000.0;
const MOON_PERIOD_S: f64 = 27.321_661 * 86_400.0;
const MOON_INCLINATION_RAD: f64 = 5.145 * std::f64::consts::PI / 180.0;
const EARTH_MOON_MASS_RATIO: f64 = 0.012_300_04; // Moon / Earth

const EARTH_ORBIT_PERIOD_S: f64 = 365.25 * 86_400.0;
const EARTH_SUN_MASS_RATIO: f64 = 3.003_48e-6; // Earth / Sun

/// Moon's ECI position at a given sim time, circular-orbit approximation.
fn moon_position(sim_time_secs: f64) -> Position {
    let theta = TAU * (sim_time_secs / MOON_PERIOD_S).fract();
    let (si, ci) = MOON_INCLINATION_RAD.sin_cos();
    let x = MOON_ORBIT_RADIUS_M * theta.cos();
    let y_flat = MOON_ORBIT_RADIUS_M * theta.sin();
    Position::new(x, y_flat * ci, y_flat * si)
}

/// Sun's *apparent* ECI position (i.e. Earth's heliocentric position,
/// negated) at a given sim time, circular-orbit approximation.
fn sun_position(sim_time_secs: f64) -> Position {
    let theta = TAU * (sim_time_secs / EARTH_ORBIT_PERIOD_S).fract();
    Position::new(AU_M * theta.cos(), AU_M * theta.sin(), 0.0)
}

/// Rodrigues' rotation of `v` about unit `axis` by `angle` radians.
fn rotate_about(v: &Position, axis: &Position, angle: f64) -> Position {
    let (s, c) = angle.sin_cos();
    let k = axis;
    let k_cross_v = k.cross(v);
    let k_dot_v = k.dot(v);
    Position::new(
        v.x * c + k_cross_v.x * s + k.x * k_dot_v * (1.0 - c),
        v.y * c + k_cross_v.y * s + k.y * k_dot_v * (1.0 - c),
        v.z * c + k_cross_v.z * s + k.z * k_dot_v * (1.0 - c),
    )
}

/// Compute an L-point's ECI position for the given system at a given sim
/// time. Earth is the coordinate origin (ECI). L3 for Sun-Earth is
/// placed ~2 AU from Earth along the Earth->Sun direction -- in this
/// Earth-centered frame that is the antipodal point across the Sun
/// (NOT the "~1 AU behind Earth" framing some readers expect); the
/// convention is made explicit here rather than silently "corrected".
pub fn lagrange_point_position(system: LagrangeSystem, point: LagrangePoint, sim_time_secs: f64) -> Position {
    let (primary, secondary, mass_ratio, normal_axis) = match system {
        LagrangeSystem::EarthMoon => {
            let moon = moon_position(sim_time_secs);
            let h = Position::new(0.0, 0.0, 1.0);
            let normal = rotate_about(&h, &Position::new(1.0, 0.0, 0.0), MOON_INCLINATION_RAD);
            (Position::default(), moon, EARTH_MOON_MASS_RATIO, normal)
        }
        LagrangeSystem::SunEarth => {
            let sun = sun_position(sim_time_secs);
            (sun, Position::default(), EARTH_SUN_MASS_RATIO, Position::new(0.0, 0.0, 1.0))
        }
    };

    let r_vec = secondary.sub(&primary);
    let r = r_vec.norm().max(1.0);
    let unit = Position::new(r_vec.x / r, r_vec.y / r, r_vec.z / r);
    let alpha = (mass_ratio / 3.0).cbrt();

    match point {
        LagrangePoint::L1 => add_scaled(&secondary, &unit, -alpha * r),
        LagrangePoint::L2 => add_scaled(&secondary, &unit, alpha * r),
        LagrangePoint::L3 => {
            let factor = 1.0 + 5.0 / 12.0 * mass_ratio;
            add_scaled(&primary, &unit, -factor * r)
        }
        LagrangePoint::L4 => {
            let rotated = rotate_about(&r_vec, &normal_axis, std::f64::consts::FRAC_PI_3);
            primary.add_scaled(&rotated, 1.0)
        }
        LagrangePoint::L5 => {
            let rotated = rotate_about(&r_vec, &normal_axis, -std::f64::consts::FRAC_PI_3);
            primary.add_scaled(&rotated, 1.0)
        }
    }
}

fn add_scaled(base: &Position, dir: &Position, scale: f64) -> Position {
    Position::new(base.x + dir.x * scale, base.y + dir.y * scale, base.z + dir.z * scale)
}

/// Solve a transfer from the current ECI state to a Lagrange point,
/// arriving at `sim_time_secs + time_of_flight_s`.
pub fn solve(
    r: &Position,
    _v: &Velocity,
    system: LagrangeSystem,
    point: LagrangePoint,
    sim_time_secs: f64,
    time_of_flight_s: f64,
    short_way: bool,
) -> ManeuverResult {
    let arrival_time = sim_time_secs + time_of_flight_s;
    let target = lagrange_point_position(system, point, arrival_time);
    let lambert_result = lambert::solve(r, &target, time_of_flight_s, short_way, Some(MU_EARTH));
    if !lambert_result.valid {
        return ManeuverResult::invalid();
    }

    let v_current = _v.as_position();
    let dv = lambert_result.v1.as_position().sub(&v_current);
    let (prograde, normal, radial) = crate::common::project_to_orbital_frame(r, &v_current, &dv);

    ManeuverResult {
        valid: true,
        prograde_mps: prograde,
        normal_mps: normal,
        radial_mps: radial,
        transfer_time_s: time_of_flight_s,
        exceeds_escape_velocity: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn em_l1_is_between_earth_and_moon() {
        let l1 = lagrange_point_position(LagrangeSystem::EarthMoon, LagrangePoint::L1, 0.0);
        let moon = moon_position(0.0);
        assert!(l1.norm() < moon.norm());
        assert!(l1.norm() > moon.norm() * 0.7);
    }

    #[test]
    fn em_l2_is_beyond_the_moon() {
        let l2 = lagrange_point_position(LagrangeSystem::EarthMoon, LagrangePoint::L2, 0.0);
        let moon = moon_position(0.0);
        assert!(l2.norm() > moon.norm());
    }

    #[test]
    fn se_l3_sits_roughly_two_au_from_earth() {
        let l3 = lagrange_point_position(LagrangeSystem::SunEarth, LagrangePoint::L3, 0.0);
        assert!((l3.norm() - 2.0 * AU_M).abs() / AU_M < 0.1);
    }

    #[test]
    fn l4_and_l5_are_equidistant_from_primary_as_secondary() {
        let moon = moon_position(0.0);
        let l4 = lagrange_point_position(LagrangeSystem::EarthMoon, LagrangePoint::L4, 0.0);
        let l5 = lagrange_point_position(LagrangeSystem::EarthMoon, LagrangePoint::L5, 0.0);
        assert!((l4.norm() - moon.norm()).abs() / moon.norm() < 0.01);
        assert!((l5.norm() - moon.norm()).abs() / moon.norm() < 0.01);
    }
}
