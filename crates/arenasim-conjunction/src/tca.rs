//! Narrow-phase time-of-closest-approach estimation.

use arenasim_core::types::{Position, Velocity};

/// `t_min = -(r . v_rel) / (v_rel . v_rel)`, the time (seconds) at which
/// a linear extrapolation of relative motion minimizes separation.
/// `None` if the relative velocity is negligible or `t_min` falls
/// outside `(0, horizon_s)`.
pub fn time_of_closest_approach(r_rel: &Position, v_rel: &Velocity, horizon_s: f64) -> Option<f64> {
    let v2 = v_rel.dot(v_rel);
    if v2 < 1e-9 {
        return None;
    }
    let r_dot_v = r_rel.x * v_rel.x + r_rel.y * v_rel.y + r_rel.z * v_rel.z;
    let t_min = -r_dot_v / v2;
    if t_min > 0.0 && t_min < horizon_s {
        Some(t_min)
    } else {
        None
    }
}

/// Distance at time `t` under linear extrapolation of relative motion.
pub fn distance_at(r_rel: &Position, v_rel: &Velocity, t: f64) -> f64 {
    let future = Position::new(
        r_rel.x + v_rel.x * t,
        r_rel.y + v_rel.y * t,
        r_rel.z + v_rel.z * t,
    );
    future.norm()
}

/// Linear trend extrapolation from the previous tick's pair distance,
/// used as a fallback when no velocity is available for one or both
/// entities.
pub fn trend_closing_rate(prev_distance_m: f64, current_distance_m: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }
    (current_distance_m - prev_distance_m) / dt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_closing_pair_has_positive_tca() {
        let r_rel = Position::new(10_000.0, 0.0, 0.0);
        let v_rel = Velocity::new(-100.0, 0.0, 0.0);
        let tca = time_of_closest_approach(&r_rel, &v_rel, 600.0).unwrap();
        assert!((tca - 100.0).abs() < 1e-6);
        assert!(distance_at(&r_rel, &v_rel, tca) < 1.0);
    }

    #[test]
    fn receding_pair_has_no_tca_in_horizon() {
        let r_rel = Position::new(10_000.0, 0.0, 0.0);
        let v_rel = Velocity::new(100.0, 0.0, 0.0);
        assert!(time_of_closest_approach(&r_rel, &v_rel, 600.0).is_none());
    }

    #[test]
    fn tca_beyond_horizon_is_rejected() {
        let r_rel = Position::new(1_000_000.0, 0.0, 0.0);
        let v_rel = Velocity::new(-10.0, 0.0, 0.0);
        assert!(time_of_closest_approach(&r_rel, &v_rel, 600.0).is_none());
    }
}
