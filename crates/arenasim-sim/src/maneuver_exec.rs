//! Maneuver-node queue: commands cross into the sim as (prograde,
//! normal, radial) delta-v requests;
//! applying one is an instantaneous velocity change at the requested
//! sim time.

use arenasim_core::types::{Position, Velocity};
use arenasim_core::EntityId;

#[derive(Debug, Clone)]
pub struct ManeuverNode {
    pub entity: EntityId,
    pub execute_at_s: f64,
    pub prograde_mps: f64,
    pub normal_mps: f64,
    pub radial_mps: f64,
}

/// Inverse of `arenasim_maneuver::common::project_to_orbital_frame`:
/// turn (prograde, normal, radial) components back into an inertial-
/// frame delta-v, given the body's current position/velocity.
pub fn to_inertial_delta_v(r: &Position, v: &Velocity, prograde: f64, normal: f64, radial: f64) -> Velocity {
    let v_pos = v.as_position();
    let prograde_hat = {
        let n = v_pos.norm().max(1e-9);
        Position::new(v_pos.x / n, v_pos.y / n, v_pos.z / n)
    };
    let radial_hat = {
        let n = r.norm().max(1e-9);
        Position::new(r.x / n, r.y / n, r.z / n)
    };
    let normal_hat = {
        let h = r.cross(&v_pos);
        let n = h.norm().max(1e-9);
        Position::new(h.x / n, h.y / n, h.z / n)
    };
    Velocity::new(
        prograde * prograde_hat.x + normal * normal_hat.x + radial * radial_hat.x,
        prograde * prograde_hat.y + normal * normal_hat.y + radial * radial_hat.y,
        prograde * prograde_hat.z + normal * normal_hat.z + radial * radial_hat.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_prograde_burn_is_parallel_to_velocity() {
        let r = Position::new(7_000_000.0, 0.0, 0.0);
        let v = Velocity::new(0.0, 7_500.0, 0.0);
        let dv = to_inertial_delta_v(&r, &v, 100.0, 0.0, 0.0);
        assert!((dv.y - 100.0).abs() < 1e-6);
        assert!(dv.x.abs() < 1e-6);
    }
}
