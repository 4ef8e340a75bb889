//! Geodetic <-> ECI frame transforms. Earth is treated as spherical (mean
//! radius), and current sim time stands in for GMST.

use arenasim_core::constants::{EARTH_RADIUS_M, EARTH_ROTATION_RATE};
use arenasim_core::types::{Position, Velocity};
use std::f64::consts::TAU;

/// Earth rotation angle (GMST proxy) at a given sim time.
pub fn gmst_proxy(sim_time_secs: f64) -> f64 {
    (EARTH_ROTATION_RATE * sim_time_secs).rem_euclid(TAU)
}

/// Convert geodetic (lat, lon in radians, alt in meters above mean radius)
/// to ECI Cartesian position at the given sim time.
pub fn geodetic_to_eci(lat: f64, lon: f64, alt: f64, sim_time_secs: f64) -> Position {
    let r = EARTH_RADIUS_M + alt;
    let x_ecef = r * lat.cos() * lon.cos();
    let y_ecef = r * lat.cos() * lon.sin();
    let z_ecef = r * lat.sin();

    let theta = gmst_proxy(sim_time_secs);
    let (s, c) = theta.sin_cos();
    Position::new(
        x_ecef * c - y_ecef * s,
        x_ecef * s + y_ecef * c,
        z_ecef,
    )
}

/// Convert an ECI position back to geodetic (lat, lon, alt).
pub fn eci_to_geodetic(pos: &Position, sim_time_secs: f64) -> (f64, f64, f64) {
    let theta = gmst_proxy(sim_time_secs);
    let (s, c) = (-theta).sin_cos();
    let x_ecef = pos.x * c - pos.y * s;
    let y_ecef = pos.x * s + pos.y * c;
    let z_ecef = pos.z;

    let r = pos.norm();
    let lat = (z_ecef / r.max(1e-9)).clamp(-1.0, 1.0).asin();
    let lon = y_ecef.atan2(x_ecef);
    let alt = r - EARTH_RADIUS_M;
    (lat, lon, alt)
}

/// Lift a ground-frame velocity triple (speed m/s, heading rad from
/// north, flight-path angle gamma rad above local horizontal) into ECI
/// velocity at the given geodetic position and sim time, including the
/// rotating-frame velocity contributed by Earth's own rotation.
pub fn geodetic_velocity_to_eci(
    lat: f64,
    lon: f64,
    alt: f64,
    speed: f64,
    heading: f64,
    gamma: f64,
    sim_time_secs: f64,
) -> Velocity {
    let v_east = speed * gamma.cos() * heading.sin();
    let v_north = speed * gamma.cos() * heading.cos();
    let v_up = speed * gamma.sin();

    // ENU basis vectors expressed in ECEF.
    let east = Position::new(-lon.sin(), lon.cos(), 0.0);
    let north = Position::new(-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos());
    let up = Position::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());

    let v_ecef = Position::new(
        v_east * east.x + v_north * north.x + v_up * up.x,
        v_east * east.y + v_north * north.y + v_up * up.y,
        v_east * east.z + v_north * north.z + v_up * up.z,
    );

    let theta = gmst_proxy(sim_time_secs);
    let (s, c) = theta.sin_cos();
    let v_eci_rot = Position::new(
        v_ecef.x * c - v_ecef.y * s,
        v_ecef.x * s + v_ecef.y * c,
        v_ecef.z,
    );

    // Add the rotating-frame velocity contribution: omega x r_eci.
    let r_eci = geodetic_to_eci(lat, lon, alt, sim_time_secs);
    let omega_cross_r = Position::new(
        -EARTH_ROTATION_RATE * r_eci.y,
        EARTH_ROTATION_RATE * r_eci.x,
        0.0,
    );

    Velocity::new(
        v_eci_rot.x + omega_cross_r.x,
        v_eci_rot.y + omega_cross_r.y,
        v_eci_rot.z + omega_cross_r.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_identity() {
        let lat = 0.4_f64;
        let lon = -1.1_f64;
        let alt = 12_000.0;
        let t = 12_345.678;
        let pos = geodetic_to_eci(lat, lon, alt, t);
        let (lat2, lon2, alt2) = eci_to_geodetic(&pos, t);
        assert!((lat - lat2).abs() < 1e-8);
        assert!((lon - lon2).abs() < 1e-8);
        assert!((alt - alt2).abs() < 1.0);
    }

    #[test]
    fn zero_rotation_at_t_zero_matches_ecef() {
        let pos = geodetic_to_eci(0.0, 0.0, 0.0, 0.0);
        assert!((pos.x - arenasim_core::constants::EARTH_RADIUS_M).abs() < 1e-6);
        assert!(pos.y.abs() < 1e-6);
        assert!(pos.z.abs() < 1e-6);
    }

    #[test]
    fn stationary_ground_point_moves_with_earth_rotation() {
        // A ground-fixed point's ECI velocity magnitude should be omega*r*cos(lat).
        let lat = 0.0;
        let lon = 0.0;
        let alt = 0.0;
        let v = geodetic_velocity_to_eci(lat, lon, alt, 0.0, 0.0, 0.0, 1000.0);
        let expected = EARTH_ROTATION_RATE * arenasim_core::constants::EARTH_RADIUS_M;
        assert!((v.speed() - expected).abs() / expected < 1e-6);
    }
}
