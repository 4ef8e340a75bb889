//! Classical orbital element conversion from ECI Cartesian state.

use arenasim_core::types::{Position, Velocity};
use std::f64::consts::{PI, TAU};

/// Classical orbital elements, or a flagged degenerate record when the
/// underlying orbit is parabolic or has (near-)zero angular momentum.
///, consumers (orbit polyline, TCA) treat `degenerate` as
/// no-data rather than propagating garbage numbers.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalElements {
    pub degenerate: bool,
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub raan_rad: f64,
    pub arg_periapsis_rad: f64,
    pub mean_anomaly_rad: f64,
    pub true_anomaly_rad: f64,
    pub apoapsis_alt_m: f64,
    pub periapsis_alt_m: f64,
    pub period_s: f64,
    pub time_to_apoapsis_s: f64,
    pub time_to_periapsis_s: f64,
    pub time_to_ascending_node_s: f64,
    pub time_to_descending_node_s: f64,
}

impl OrbitalElements {
    fn degenerate() -> Self {
        Self {
            degenerate: true,
            semi_major_axis_m: 0.0,
            eccentricity: 0.0,
            inclination_rad: 0.0,
            raan_rad: 0.0,
            arg_periapsis_rad: 0.0,
            mean_anomaly_rad: 0.0,
            true_anomaly_rad: 0.0,
            apoapsis_alt_m: 0.0,
            periapsis_alt_m: 0.0,
            period_s: 0.0,
            time_to_apoapsis_s: 0.0,
            time_to_periapsis_s: 0.0,
            time_to_ascending_node_s: 0.0,
            time_to_descending_node_s: 0.0,
        }
    }
}

/// Convert true anomaly to mean anomaly for an elliptical orbit of
/// eccentricity `e`.
fn true_to_mean_anomaly(nu: f64, e: f64) -> f64 {
    let ecc_anomaly = 2.0 * ((1.0 - e).sqrt() * (nu / 2.0).tan()).atan2((1.0 + e).sqrt());
    let ecc_anomaly = ecc_anomaly.rem_euclid(TAU);
    (ecc_anomaly - e * ecc_anomaly.sin()).rem_euclid(TAU)
}

/// Convert ECI position and velocity to classical orbital elements,
/// with Earth mean radius used for altitude reporting.
pub fn from_state(r_vec: &Position, v_vec: &Velocity, mu: f64, body_radius_m: f64) -> OrbitalElements {
    let r = r_vec.norm();
    let v = v_vec.speed();
    if r < 1.0 {
        return OrbitalElements::degenerate();
    }

    let v_pos = v_vec.as_position();
    let h_vec = r_vec.cross(&v_pos);
    let h = h_vec.norm();
    if h < 1.0 {
        return OrbitalElements::degenerate(); // degenerate: near-zero angular momentum
    }

    let k = Position::new(0.0, 0.0, 1.0);
    let n_vec = k.cross(&h_vec);
    let n = n_vec.norm();

    let r_dot_v = r_vec.dot(&v_pos);
    let e_vec_scale = v * v - mu / r;
    let e_vec = Position::new(
        (e_vec_scale * r_vec.x - r_dot_v * v_vec.x) / mu,
        (e_vec_scale * r_vec.y - r_dot_v * v_vec.y) / mu,
        (e_vec_scale * r_vec.z - r_dot_v * v_vec.z) / mu,
    );
    let e = e_vec.norm();

    if (e - 1.0).abs() < 1e-6 {
        return OrbitalElements::degenerate(); // parabolic
    }

    let energy = v * v / 2.0 - mu / r;
    let a = -mu / (2.0 * energy);

    let inclination = (h_vec.z / h).clamp(-1.0, 1.0).acos();

    let raan = if n > 1e-9 {
        let raan = (n_vec.x / n).clamp(-1.0, 1.0).acos();
        if n_vec.y < 0.0 { TAU - raan } else { raan }
    } else {
        0.0
    };

    let arg_periapsis = if n > 1e-9 && e > 1e-9 {
        let cos_arg = (n_vec.dot(&e_vec) / (n * e)).clamp(-1.0, 1.0);
        let arg = cos_arg.acos();
        if e_vec.z < 0.0 { TAU - arg } else { arg }
    } else {
        0.0
    };

    let true_anomaly = if e > 1e-9 {
        let cos_nu = (e_vec.dot(r_vec) / (e * r)).clamp(-1.0, 1.0);
        let nu = cos_nu.acos();
        if r_dot_v < 0.0 { TAU - nu } else { nu }
    } else {
        0.0
    };

    let period = if a > 0.0 { TAU * (a.powi(3) / mu).sqrt() } else { f64::INFINITY };
    let apoapsis_alt = a * (1.0 + e) - body_radius_m;
    let periapsis_alt = a * (1.0 - e) - body_radius_m;

    let (mean_anomaly, time_to_apoapsis, time_to_periapsis, time_to_an, time_to_dn) = if a > 0.0 {
        let mean_motion = (mu / a.powi(3)).sqrt();
        let m_now = true_to_mean_anomaly(true_anomaly, e);

        let time_since_periapsis = m_now / mean_motion;
        let t_to_periapsis = (period - time_since_periapsis).rem_euclid(period);
        let t_to_apoapsis = ((period / 2.0) - time_since_periapsis).rem_euclid(period);

        let nu_an = (-arg_periapsis).rem_euclid(TAU);
        let nu_dn = (PI - arg_periapsis).rem_euclid(TAU);
        let m_an = true_to_mean_anomaly(nu_an, e);
        let m_dn = true_to_mean_anomaly(nu_dn, e);
        let t_to_an = ((m_an - m_now).rem_euclid(TAU)) / mean_motion;
        let t_to_dn = ((m_dn - m_now).rem_euclid(TAU)) / mean_motion;

        (m_now, t_to_apoapsis, t_to_periapsis, t_to_an, t_to_dn)
    } else {
        // Hyperbolic: apoapsis/node timing isn't periodic; report not-applicable as zero.
        (0.0, 0.0, 0.0, 0.0, 0.0)
    };

    OrbitalElements {
        degenerate: false,
        semi_major_axis_m: a,
        eccentricity: e,
        inclination_rad: inclination,
        raan_rad: raan,
        arg_periapsis_rad: arg_periapsis,
        mean_anomaly_rad: mean_anomaly,
        true_anomaly_rad: true_anomaly,
        apoapsis_alt_m: apoapsis_alt,
        periapsis_alt_m: periapsis_alt,
        period_s: period,
        time_to_apoapsis_s: time_to_apoapsis,
        time_to_periapsis_s: time_to_periapsis,
        time_to_ascending_node_s: time_to_an,
        time_to_descending_node_s: time_to_dn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenasim_core::constants::{EARTH_RADIUS_M, MU_EARTH};

    #[test]
    fn circular_equatorial_orbit_has_zero_eccentricity() {
        let r_mag = 7_000_000.0;
        let v_mag = (MU_EARTH / r_mag).sqrt();
        let r = Position::new(r_mag, 0.0, 0.0);
        let v = Velocity::new(0.0, v_mag, 0.0);
        let el = from_state(&r, &v, MU_EARTH, EARTH_RADIUS_M);
        assert!(!el.degenerate);
        assert!(el.eccentricity < 1e-6);
        assert!((el.semi_major_axis_m - r_mag).abs() < 1.0);
        assert!(el.inclination_rad < 1e-6);
    }

    #[test]
    fn parabolic_orbit_is_flagged_degenerate() {
        let r_mag = 7_000_000.0;
        let v_escape = (2.0 * MU_EARTH / r_mag).sqrt();
        let r = Position::new(r_mag, 0.0, 0.0);
        let v = Velocity::new(0.0, v_escape, 0.0);
        let el = from_state(&r, &v, MU_EARTH, EARTH_RADIUS_M);
        assert!(el.degenerate);
    }

    #[test]
    fn zero_angular_momentum_is_flagged_degenerate() {
        let r = Position::new(7_000_000.0, 0.0, 0.0);
        let v = Velocity::new(-1000.0, 0.0, 0.0); // purely radial
        let el = from_state(&r, &v, MU_EARTH, EARTH_RADIUS_M);
        assert!(el.degenerate);
    }

    #[test]
    fn inclined_orbit_reports_inclination() {
        let r_mag = 7_000_000.0;
        let v_mag = (MU_EARTH / r_mag).sqrt();
        let incl = 51.6_f64.to_radians();
        let r = Position::new(r_mag, 0.0, 0.0);
        let v = Velocity::new(0.0, v_mag * incl.cos(), v_mag * incl.sin());
        let el = from_state(&r, &v, MU_EARTH, EARTH_RADIUS_M);
        assert!((el.inclination_rad - incl).abs() < 1e-3);
    }
}
