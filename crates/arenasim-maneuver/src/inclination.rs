//! Pure inclination-change burn at the nearest orbital node.

use crate::common::ManeuverResult;
use arenasim_core::constants::MU_EARTH;
use arenasim_core::types::{Position, Velocity};
use arenasim_orbital::{elements, propagate};

/// Compute a pure plane-change burn to alter inclination by `delta_i_rad`,
/// placing the burn at whichever node (ascending or descending) comes up
/// sooner. Sign of the normal component is chosen by node identity.
pub fn solve(r: &Position, v: &Velocity, delta_i_rad: f64, mu: Option<f64>) -> ManeuverResult {
    let mu = mu.unwrap_or(MU_EARTH);
    let el = elements::from_state(r, v, mu, 0.0);
    if el.degenerate {
        return ManeuverResult::invalid();
    }

    let at_ascending = el.time_to_ascending_node_s <= el.time_to_descending_node_s;
    let time_to_node = if at_ascending {
        el.time_to_ascending_node_s
    } else {
        el.time_to_descending_node_s
    };

    let propagated = propagate(r, v, time_to_node, mu);
    if !propagated.valid {
        return ManeuverResult::invalid();
    }

    let v_node = propagated.velocity.speed();
    let dv_mag = 2.0 * v_node * (delta_i_rad.abs() / 2.0).sin();
    // Ascending-node burns rotate the plane one way, descending the other,
    // for the same signed `delta_i_rad`.
    let sign = if at_ascending { 1.0 } else { -1.0 } * delta_i_rad.signum();

    let r_node = propagated.position.norm();
    let v_escape = (2.0 * mu / r_node).sqrt();

    ManeuverResult {
        valid: true,
        prograde_mps: 0.0,
        normal_mps: sign * dv_mag,
        radial_mps: 0.0,
        transfer_time_s: time_to_node,
        exceeds_escape_velocity: v_node > v_escape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenasim_core::constants::EARTH_RADIUS_M;

    #[test]
    fn zero_inclination_change_has_zero_delta_v() {
        let r = Position::new(EARTH_RADIUS_M + 500_000.0, 0.0, 0.0);
        let v_mag = (MU_EARTH / r.norm()).sqrt();
        let v = Velocity::new(0.0, v_mag, 0.0);
        let result = solve(&r, &v, 0.0, None);
        assert!(result.valid);
        assert!(result.normal_mps.abs() < 1e-6);
    }

    #[test]
    fn larger_inclination_change_costs_more_delta_v() {
        let r = Position::new(EARTH_RADIUS_M + 500_000.0, 0.0, 0.0);
        let v_mag = (MU_EARTH / r.norm()).sqrt();
        let v = Velocity::new(0.0, v_mag, 0.0);
        let small = solve(&r, &v, 5.0_f64.to_radians(), None);
        let large = solve(&r, &v, 20.0_f64.to_radians(), None);
        assert!(large.delta_v_mps > small.delta_v_mps);
    }
}
