//! Conjunction alert severity classification and the `ConjunctionAlert`
//! record.

use arenasim_core::constants::{CONJUNCTION_CRITICAL_M, CONJUNCTION_WARNING_M, CONJUNCTION_WATCH_M};
use arenasim_core::enums::AlertSeverity;
use arenasim_core::types::Position;
use arenasim_core::EntityId;

#[derive(Debug, Clone)]
pub struct ConjunctionAlert {
    pub a: EntityId,
    pub b: EntityId,
    pub name_a: String,
    pub name_b: String,
    pub distance_m: f64,
    pub tca_s: Option<f64>,
    pub severity: AlertSeverity,
    pub eci_midpoint: Position,
}

/// Classify instantaneous distance against the critical/warning/watch thresholds.
pub fn severity_for_distance(distance_m: f64) -> Option<AlertSeverity> {
    if distance_m <= CONJUNCTION_CRITICAL_M {
        Some(AlertSeverity::Critical)
    } else if distance_m <= CONJUNCTION_WARNING_M {
        Some(AlertSeverity::Warning)
    } else if distance_m <= CONJUNCTION_WATCH_M {
        Some(AlertSeverity::Watch)
    } else {
        None
    }
}

/// Upgrade severity if a TCA distance crosses into a lower threshold
/// than the instantaneous one.
pub fn upgrade_for_tca(current: AlertSeverity, tca_distance_m: f64) -> AlertSeverity {
    match severity_for_distance(tca_distance_m) {
        Some(tca_severity) if tca_severity > current => tca_severity,
        _ => current,
    }
}

pub fn midpoint(a: &Position, b: &Position) -> Position {
    Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0)
}

/// Sort by severity (descending) then distance (ascending), capped at
/// `CONJUNCTION_MAX_ALERTS` for display.
pub fn sort_and_cap(mut alerts: Vec<ConjunctionAlert>, cap: usize) -> Vec<ConjunctionAlert> {
    alerts.sort_by(|x, y| {
        y.severity
            .cmp(&x.severity)
            .then(x.distance_m.partial_cmp(&y.distance_m).unwrap())
    });
    alerts.truncate(cap);
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_match_spec_boundaries() {
        assert_eq!(severity_for_distance(500.0), Some(AlertSeverity::Critical));
        assert_eq!(severity_for_distance(5_000.0), Some(AlertSeverity::Warning));
        assert_eq!(severity_for_distance(40_000.0), Some(AlertSeverity::Watch));
        assert_eq!(severity_for_distance(60_000.0), None);
    }

    #[test]
    fn tca_upgrade_never_downgrades() {
        let upgraded = upgrade_for_tca(AlertSeverity::Watch, 500.0);
        assert_eq!(upgraded, AlertSeverity::Critical);
        let unchanged = upgrade_for_tca(AlertSeverity::Critical, 40_000.0);
        assert_eq!(unchanged, AlertSeverity::Critical);
    }

    #[test]
    fn sort_orders_by_severity_then_distance() {
        let a = ConjunctionAlert {
            a: "a".into(), b: "b".into(), name_a: "A".into(), name_b: "B".into(),
            distance_m: 900.0, tca_s: None, severity: AlertSeverity::Critical, eci_midpoint: Position::default(),
        };
        let w = ConjunctionAlert {
            a: "c".into(), b: "d".into(), name_a: "C".into(), name_b: "D".into(),
            distance_m: 100.0, tca_s: None, severity: AlertSeverity::Watch, eci_midpoint: Position::default(),
        };
        let sorted = sort_and_cap(vec![w, a], 50);
        assert_eq!(sorted[0].severity, AlertSeverity::Critical);
    }
}
