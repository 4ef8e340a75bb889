//! Patched-conic interplanetary transfer with simple circular ephemerides
//! for the inner planets.

use crate::common::ManeuverResult;
use crate::lambert;
use arenasim_core::constants::{AU_M, EARTH_RADIUS_M, MU_EARTH, MU_SUN};
use arenasim_core::types::{Position, Velocity};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planet {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
}

struct PlanetOrbit {
    radius_au: f64,
    period_days: f64,
}

fn orbit_for(planet: Planet) -> PlanetOrbit {
    match planet {
        Planet::Mercury => PlanetOrbit { radius_au: 0.387, period_days: 87.97 },
        Planet::Venus => PlanetOrbit { radius_au: 0.723, period_days: 224.70 },
        Planet::Earth => PlanetOrbit { radius_au: 1.0, period_days: 365.25 },
        Planet::Mars => PlanetOrbit { radius_au: 1.524, period_days: 686.98 },
        Planet::Jupiter => PlanetOrbit { radius_au: 5.203, period_days: 4_332.59 },
    }
}

/// Heliocentric position and velocity for a planet at a given sim time,
/// circular-orbit approximation (the phase origin, theta=0 at t=0, is
/// arbitrary but consistent across planets for a given call site).
fn heliocentric_state(planet: Planet, sim_time_secs: f64) -> (Position, Velocity) {
    let orbit = orbit_for(planet);
    let r = orbit.radius_au * AU_M;
    let period_s = orbit.period_days * 86_400.0;
    let theta = TAU * (sim_time_secs / period_s).fract();
    let v_circ = (MU_SUN / r).sqrt();
    let pos = Position::new(r * theta.cos(), r * theta.sin(), 0.0);
    let vel = Velocity::new(-v_circ * theta.sin(), v_circ * theta.cos(), 0.0);
    (pos, vel)
}

/// Solve a patched-conic transfer from Earth parking orbit (radius
/// `parking_radius_m`) to `target` departing at `sim_time_secs`, arriving
/// `time_of_flight_s` later.
pub fn solve(
    target: Planet,
    parking_radius_m: f64,
    sim_time_secs: f64,
    time_of_flight_s: f64,
    short_way: bool,
) -> ManeuverResult {
    let (earth_r, earth_v) = heliocentric_state(Planet::Earth, sim_time_secs);
    let (target_r, _target_v) = heliocentric_state(target, sim_time_secs + time_of_flight_s);

    let transfer = lambert::solve(&earth_r, &target_r, time_of_flight_s, short_way, Some(MU_SUN));
    if !transfer.valid {
        return ManeuverResult::invalid();
    }

    let v_inf_vec = transfer.v1.sub(&earth_v);
    let v_inf = v_inf_vec.speed();

    let v_circ_parking = (MU_EARTH / parking_radius_m).sqrt();
    let v_departure = (v_inf * v_inf + 2.0 * MU_EARTH / parking_radius_m).sqrt();
    let dv = v_departure - v_circ_parking;

    ManeuverResult {
        valid: true,
        prograde_mps: dv,
        normal_mps: 0.0,
        radial_mps: 0.0,
        transfer_time_s: time_of_flight_s,
        exceeds_escape_velocity: v_departure > (2.0 * MU_EARTH / parking_radius_m).sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earth_to_mars_transfer_is_valid_for_typical_hohmann_tof() {
        let parking_radius = EARTH_RADIUS_M + 300_000.0;
        // Rough heliocentric Hohmann transfer time Earth->Mars.
        let tof = 0.71 * 365.25 * 86_400.0;
        let result = solve(Planet::Mars, parking_radius, 0.0, tof, true);
        assert!(result.valid);
        assert!(result.prograde_mps > 0.0);
        assert!(result.prograde_mps < 10_000.0); // sane departure dv, not a numerical blowup
    }

    #[test]
    fn venus_transfer_also_converges() {
        let parking_radius = EARTH_RADIUS_M + 300_000.0;
        let tof = 0.4 * 365.25 * 86_400.0;
        let result = solve(Planet::Venus, parking_radius, 0.0, tof, true);
        assert!(result.valid);
    }
}
