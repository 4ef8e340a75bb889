//! Source-level (SL) model: radiated noise as a function of speed,
//! platform type, and surfaced/submerged state.

/// Source level in dB for a target moving at `speed_kts`.
///
/// Submarines below 5 kts are treated as near-silent (flooring at the
/// 100 dB self-noise baseline rather than the speed curve); surface
/// targets carry a flat 15 dB radiated-noise penalty over a submerged
/// target of the same speed.
pub fn source_level_db(speed_kts: f64, is_submarine: bool, is_surfaced: bool) -> f64 {
    if is_submarine && !is_surfaced && speed_kts < 5.0 {
        return 100.0;
    }
    let base = 120.0 + 40.0 * (speed_kts.max(1.0) / 5.0).log10();
    if is_surfaced {
        base + 15.0
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_submarine_floors_at_100_db() {
        assert_eq!(source_level_db(2.0, true, false), 100.0);
    }

    #[test]
    fn surface_target_is_louder_than_submerged_at_same_speed() {
        let surface = source_level_db(15.0, false, true);
        let submerged = source_level_db(15.0, true, false);
        assert!(surface > submerged);
    }

    #[test]
    fn source_level_increases_with_speed() {
        let slow = source_level_db(6.0, true, false);
        let fast = source_level_db(20.0, true, false);
        assert!(fast > slow);
    }
}
