//! Plane-matching burn: aligns the entity's orbital plane to a target's,
//! burning at the point of closest alignment to the line of nodes
//!

use crate::common::ManeuverResult;
use arenasim_core::constants::MU_EARTH;
use arenasim_core::types::{Position, Velocity};
use arenasim_orbital::elements;
use std::f64::consts::TAU;

/// Position along an orbit at a given true anomaly, given its elements.
fn position_at_true_anomaly(el: &elements::OrbitalElements, nu: f64) -> Position {
    let e = el.eccentricity;
    let a = el.semi_major_axis_m;
    let r = a * (1.0 - e * e) / (1.0 + e * nu.cos());
    // Position in the orbital plane (perifocal frame), then rotated by
    // argument of periapsis, inclination, RAAN into the parent frame.
    let x_pf = r * nu.cos();
    let y_pf = r * nu.sin();

    let (sw, cw) = el.arg_periapsis_rad.sin_cos();
    let (si, ci) = el.inclination_rad.sin_cos();
    let (so, co) = el.raan_rad.sin_cos();

    let x = (co * cw - so * sw * ci) * x_pf + (-co * sw - so * cw * ci) * y_pf;
    let y = (so * cw + co * sw * ci) * x_pf + (-so * sw + co * cw * ci) * y_pf;
    let z = (sw * si) * x_pf + (cw * si) * y_pf;
    Position::new(x, y, z)
}

fn speed_at_true_anomaly(el: &elements::OrbitalElements, nu: f64, mu: f64) -> f64 {
    let e = el.eccentricity;
    let a = el.semi_major_axis_m;
    let r = a * (1.0 - e * e) / (1.0 + e * nu.cos());
    (mu * (2.0 / r - 1.0 / a)).sqrt()
}

/// Compute a plane-match burn for `(r, v)` to align with `(target_r,
/// target_v)`'s orbital plane.
pub fn solve(r: &Position, v: &Velocity, target_r: &Position, target_v: &Velocity, mu: Option<f64>) -> ManeuverResult {
    let mu = mu.unwrap_or(MU_EARTH);
    let el = elements::from_state(r, v, mu, 0.0);
    let target_el = elements::from_state(target_r, target_v, mu, 0.0);
    if el.degenerate || target_el.degenerate {
        return ManeuverResult::invalid();
    }

    let v_pos = v.as_position();
    let target_v_pos = target_v.as_position();
    let h1 = r.cross(&v_pos);
    let h2 = target_r.cross(&target_v_pos);
    let line_of_nodes = h1.cross(&h2);
    if line_of_nodes.norm() < 1e-3 {
        // Planes already coincident (or counter-aligned).
        return ManeuverResult {
            valid: true,
            prograde_mps: 0.0,
            normal_mps: 0.0,
            radial_mps: 0.0,
            transfer_time_s: 0.0,
            exceeds_escape_velocity: false,
        };
    }
    let lon_hat = {
        let n = line_of_nodes.norm();
        Position::new(line_of_nodes.x / n, line_of_nodes.y / n, line_of_nodes.z / n)
    };

    // Coarse scan in 5-degree steps, refine with binary subdivision.
    let step = 5.0_f64.to_radians();
    let mut best_nu = 0.0_f64;
    let mut best_alignment = f64::MIN;
    let mut nu = 0.0;
    while nu < TAU {
        let pos = position_at_true_anomaly(&el, nu);
        let n = pos.norm().max(1e-9);
        let alignment = (pos.x / n) * lon_hat.x + (pos.y / n) * lon_hat.y + (pos.z / n) * lon_hat.z;
        if alignment > best_alignment {
            best_alignment = alignment;
            best_nu = nu;
        }
        nu += step;
    }

    let mut lo = best_nu - step;
    let mut hi = best_nu + step;
    for _ in 0..20 {
        let mid1 = lo + (hi - lo) / 3.0;
        let mid2 = hi - (hi - lo) / 3.0;
        let score = |t: f64| {
            let pos = position_at_true_anomaly(&el, t);
            let n = pos.norm().max(1e-9);
            (pos.x / n) * lon_hat.x + (pos.y / n) * lon_hat.y + (pos.z / n) * lon_hat.z
        };
        if score(mid1) < score(mid2) {
            lo = mid1;
        } else {
            hi = mid2;
        }
    }
    let nu_burn = (lo + hi) / 2.0;

    let v_at_burn = speed_at_true_anomaly(&el, nu_burn, mu);
    let cos_di = (h1.dot(&h2) / (h1.norm() * h2.norm())).clamp(-1.0, 1.0);
    let delta_i = cos_di.acos();
    let dv = 2.0 * v_at_burn * (delta_i / 2.0).sin();

    let time_to_burn = {
        let m_now = el.mean_anomaly_rad;
        let m_burn = true_to_mean(nu_burn, el.eccentricity);
        let mean_motion = (mu / el.semi_major_axis_m.powi(3)).sqrt();
        ((m_burn - m_now).rem_euclid(TAU)) / mean_motion
    };

    ManeuverResult {
        valid: true,
        prograde_mps: 0.0,
        normal_mps: dv,
        radial_mps: 0.0,
        transfer_time_s: time_to_burn,
        exceeds_escape_velocity: false,
    }
}

fn true_to_mean(nu: f64, e: f64) -> f64 {
    let ecc_anomaly = 2.0 * ((1.0 - e).sqrt() * (nu / 2.0).tan()).atan2((1.0 + e).sqrt());
    let ecc_anomaly = ecc_anomaly.rem_euclid(TAU);
    (ecc_anomaly - e * ecc_anomaly.sin()).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenasim_core::constants::EARTH_RADIUS_M;

    #[test]
    fn coplanar_orbits_need_no_burn() {
        let r_mag = EARTH_RADIUS_M + 500_000.0;
        let v_mag = (MU_EARTH / r_mag).sqrt();
        let r = Position::new(r_mag, 0.0, 0.0);
        let v = Velocity::new(0.0, v_mag, 0.0);
        let target_r = Position::new(0.0, r_mag, 0.0);
        let target_v = Velocity::new(-v_mag, 0.0, 0.0);
        let result = solve(&r, &v, &target_r, &target_v, None);
        assert!(result.valid);
        assert!(result.normal_mps.abs() < 1.0);
    }

    #[test]
    fn inclined_target_requires_nonzero_burn() {
        let r_mag = EARTH_RADIUS_M + 500_000.0;
        let v_mag = (MU_EARTH / r_mag).sqrt();
        let r = Position::new(r_mag, 0.0, 0.0);
        let v = Velocity::new(0.0, v_mag, 0.0);
        let incl = 30.0_f64.to_radians();
        let target_r = Position::new(r_mag, 0.0, 0.0);
        let target_v = Velocity::new(0.0, v_mag * incl.cos(), v_mag * incl.sin());
        let result = solve(&r, &v, &target_r, &target_v, None);
        assert!(result.valid);
        assert!(result.normal_mps.abs() > 1.0);
    }
}
