//! Natural Motion Circumnavigation: a bounded relative orbit around a
//! target via Clohessy-Wiltshire dynamics.

use crate::common::ManeuverResult;
use arenasim_core::constants::MU_EARTH;
use arenasim_core::types::{Position, Velocity};

/// RIC (Radial / In-track / Cross-track) frame attached to the target.
struct RicFrame {
    radial: Position,
    intrack: Position,
    crosstrack: Position,
}

fn ric_frame(target_r: &Position, target_v: &Velocity) -> RicFrame {
    let radial = {
        let n = target_r.norm().max(1e-9);
        Position::new(target_r.x / n, target_r.y / n, target_r.z / n)
    };
    let crosstrack = {
        let h = target_r.cross(&target_v.as_position());
        let n = h.norm().max(1e-9);
        Position::new(h.x / n, h.y / n, h.z / n)
    };
    let intrack = crosstrack.cross(&radial);
    RicFrame { radial, intrack, crosstrack }
}

fn to_ric(frame: &RicFrame, vec: &Position) -> Position {
    Position::new(vec.dot(&frame.radial), vec.dot(&frame.intrack), vec.dot(&frame.crosstrack))
}

fn from_ric(frame: &RicFrame, ric: &Position) -> Position {
    Position::new(
        ric.x * frame.radial.x + ric.y * frame.intrack.x + ric.z * frame.crosstrack.x,
        ric.x * frame.radial.y + ric.y * frame.intrack.y + ric.z * frame.crosstrack.y,
        ric.x * frame.radial.z + ric.y * frame.intrack.z + ric.z * frame.crosstrack.z,
    )
}

/// Compute the instantaneous delta-v for the chaser at `(chaser_r,
/// chaser_v)` to enter a circumnavigation loop of radius `loop_radius_m`
/// around the target at `(target_r, target_v)`.
pub fn solve(
    chaser_r: &Position,
    chaser_v: &Velocity,
    target_r: &Position,
    target_v: &Velocity,
    loop_radius_m: f64,
    mu: Option<f64>,
) -> ManeuverResult {
    let mu = mu.unwrap_or(MU_EARTH);
    let target_r_mag = target_r.norm();
    if target_r_mag < 1.0 || loop_radius_m <= 0.0 {
        return ManeuverResult::invalid();
    }
    let n = (mu / target_r_mag.powi(3)).sqrt(); // target mean motion

    let frame = ric_frame(target_r, target_v);
    let rel_pos_eci = chaser_r.sub(target_r);
    let rel_vel_eci = chaser_v.sub(target_v).as_position();

    let rel_pos_ric = to_ric(&frame, &rel_pos_eci);
    let b = loop_radius_m;

    // Solve phi from the current relative position's radial/in-track
    // components against the Clohessy-Wiltshire periodic solution
    // (-b cos(phi), 2b sin(phi), 0).5.
    let phi = (rel_pos_ric.y / (2.0 * b)).clamp(-1.0, 1.0).asin();
    let phi = if rel_pos_ric.x > 0.0 { std::f64::consts::PI - phi } else { phi };

    let required_vel_ric = Position::new(b * n * phi.sin(), 2.0 * b * n * phi.cos(), 0.0);
    let current_vel_ric = to_ric(&frame, &rel_vel_eci);

    let dv_ric = Position::new(
        required_vel_ric.x - current_vel_ric.x,
        required_vel_ric.y - current_vel_ric.y,
        required_vel_ric.z - current_vel_ric.z,
    );
    let dv_eci = from_ric(&frame, &dv_ric);

    let (prograde, normal, radial) = crate::common::project_to_orbital_frame(
        chaser_r,
        &chaser_v.as_position(),
        &dv_eci,
    );

    ManeuverResult {
        valid: true,
        prograde_mps: prograde,
        normal_mps: normal,
        radial_mps: radial,
        transfer_time_s: 0.0, // instantaneous burn, no coast to a future epoch
        exceeds_escape_velocity: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenasim_core::constants::EARTH_RADIUS_M;

    #[test]
    fn colocated_chaser_still_produces_valid_result() {
        let r_mag = EARTH_RADIUS_M + 500_000.0;
        let v_mag = (MU_EARTH / r_mag).sqrt();
        let target_r = Position::new(r_mag, 0.0, 0.0);
        let target_v = Velocity::new(0.0, v_mag, 0.0);
        let chaser_r = Position::new(r_mag, 100.0, 0.0);
        let chaser_v = Velocity::new(0.0, v_mag, 0.0);
        let result = solve(&chaser_r, &chaser_v, &target_r, &target_v, 200.0, None);
        assert!(result.valid);
        assert!(result.delta_v_mps().is_finite());
    }

    #[test]
    fn larger_loop_radius_changes_required_delta_v() {
        let r_mag = EARTH_RADIUS_M + 500_000.0;
        let v_mag = (MU_EARTH / r_mag).sqrt();
        let target_r = Position::new(r_mag, 0.0, 0.0);
        let target_v = Velocity::new(0.0, v_mag, 0.0);
        let chaser_r = Position::new(r_mag, 100.0, 0.0);
        let chaser_v = Velocity::new(0.0, v_mag, 0.0);
        let small = solve(&chaser_r, &chaser_v, &target_r, &target_v, 100.0, None);
        let large = solve(&chaser_r, &chaser_v, &target_r, &target_v, 1000.0, None);
        assert!((small.delta_v_mps() - large.delta_v_mps()).abs() > 1e-6);
    }
}
