//! Shared result type for every maneuver solver in this crate.

use arenasim_core::types::Position;

/// Structured output every solver in this crate returns: `valid` plus
/// enough data (prograde/normal/radial delta-v in the current orbital
/// frame) to create a maneuver node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManeuverResult {
    pub valid: bool,
    pub prograde_mps: f64,
    pub normal_mps: f64,
    pub radial_mps: f64,
    pub transfer_time_s: f64,
    /// True if the resulting post-burn speed exceeds local escape velocity.
    pub exceeds_escape_velocity: bool,
}

impl ManeuverResult {
    pub fn delta_v_mps(&self) -> f64 {
        (self.prograde_mps.powi(2) + self.normal_mps.powi(2) + self.radial_mps.powi(2)).sqrt()
    }

    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Project an inertial-frame delta-v vector onto the (prograde, normal,
/// radial) orbital frame defined by the current `r`, `v`.
pub fn project_to_orbital_frame(r: &Position, v: &Position, dv: &Position) -> (f64, f64, f64) {
    let prograde_hat = {
        let n = v.norm().max(1e-9);
        Position::new(v.x / n, v.y / n, v.z / n)
    };
    let radial_hat = {
        let n = r.norm().max(1e-9);
        Position::new(r.x / n, r.y / n, r.z / n)
    };
    let normal_hat = {
        let h = r.cross(v);
        let n = h.norm().max(1e-9);
        Position::new(h.x / n, h.y / n, h.z / n)
    };
    (dv.dot(&prograde_hat), dv.dot(&normal_hat), dv.dot(&radial_hat))
}
