//! Line-of-sight test: the Earth is a sphere of mean radius; LOS holds
//! iff the line segment between two endpoints never passes within that
//! radius of Earth's center.

use arenasim_core::constants::EARTH_RADIUS_M;
use arenasim_core::types::Position;

/// Whether `a` and `b` (ECI meters) have an unobstructed line of sight.
pub fn has_los(a: &Position, b: &Position) -> bool {
    let d = b.sub(a);
    let len2 = d.dot(&d);
    if len2 < 1e-9 {
        return a.norm() > EARTH_RADIUS_M;
    }
    let t = (-(a.dot(&d)) / len2).clamp(0.0, 1.0);
    let closest = a.add_scaled(&d, t);
    closest.norm() > EARTH_RADIUS_M
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_points_on_the_same_side_have_los() {
        let a = Position::new(EARTH_RADIUS_M + 500_000.0, 0.0, 0.0);
        let b = Position::new(0.0, EARTH_RADIUS_M + 500_000.0, 0.0);
        assert!(has_los(&a, &b));
    }

    #[test]
    fn antipodal_points_are_blocked_by_earth() {
        let a = Position::new(EARTH_RADIUS_M + 500_000.0, 0.0, 0.0);
        let b = Position::new(-(EARTH_RADIUS_M + 500_000.0), 0.0, 0.0);
        assert!(!has_los(&a, &b));
    }

    #[test]
    fn coincident_points_above_earth_have_los() {
        let a = Position::new(EARTH_RADIUS_M + 1000.0, 0.0, 0.0);
        assert!(has_los(&a, &a));
    }
}
