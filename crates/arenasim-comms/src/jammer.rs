//! Jammer noise contribution and J/S-ratio link degradation
//!

use arenasim_core::enums::{JamDirection, JammerType};
use arenasim_core::types::Position;
use arenasim_core::EntityId;

use crate::link_budget::fspl_db;
use crate::los::has_los;

#[derive(Debug, Clone)]
pub struct Jammer {
    pub id: EntityId,
    pub jammer_type: JammerType,
    pub direction: JamDirection,
    pub position: Position,
    pub power_dbw: f64,
    pub freq_min_hz: f64,
    pub freq_max_hz: f64,
    pub range_m: f64,
    pub active: bool,
}

impl Jammer {
    fn overlaps_band(&self, link_freq_hz: f64) -> bool {
        match self.jammer_type {
            JammerType::Barrage | JammerType::Noise => {
                link_freq_hz >= self.freq_min_hz && link_freq_hz <= self.freq_max_hz
            }
            JammerType::Spot => {
                let center = (self.freq_min_hz + self.freq_max_hz) / 2.0;
                let tolerance = (self.freq_max_hz - self.freq_min_hz).max(1e6) / 2.0;
                (link_freq_hz - center).abs() <= tolerance
            }
            JammerType::Sweep => link_freq_hz >= self.freq_min_hz && link_freq_hz <= self.freq_max_hz,
        }
    }

    /// Fraction of time-on-target for duty-cycled jammer types.
    fn duty_cycle(&self) -> f64 {
        match self.jammer_type {
            JammerType::Sweep => 0.5,
            _ => 1.0,
        }
    }

    fn applies_to(&self, is_uplink: bool) -> bool {
        match self.direction {
            JamDirection::Both => true,
            JamDirection::Uplink => is_uplink,
            JamDirection::Downlink => !is_uplink,
        }
    }
}

/// Jammer power received at `target_pos`, watts, or `None` if the
/// jammer is inactive, out of band, out of range, or has no LOS.
pub fn jam_power_w(jammer: &Jammer, target_pos: &Position, link_freq_hz: f64, is_uplink: bool) -> Option<f64> {
    if !jammer.active || !jammer.applies_to(is_uplink) || !jammer.overlaps_band(link_freq_hz) {
        return None;
    }
    let range = jammer.position.range_to(target_pos);
    if range > jammer.range_m || !has_los(&jammer.position, target_pos) {
        return None;
    }
    let path_loss = fspl_db(range, link_freq_hz);
    let duty_db = 10.0 * jammer.duty_cycle().log10();
    let rx_dbw = jammer.power_dbw - path_loss + duty_db;
    Some(10f64.powf(rx_dbw / 10.0))
}

/// Sum of all active jammers' contribution at a target, watts.
pub fn total_jam_power_w(jammers: &[Jammer], target_pos: &Position, link_freq_hz: f64, is_uplink: bool) -> f64 {
    jammers
        .iter()
        .filter_map(|j| jam_power_w(j, target_pos, link_freq_hz, is_uplink))
        .sum()
}

/// J/S ratio in dB: positive kills the link outright.
pub fn js_ratio_db(jam_power_w: f64, rx_power_w: f64) -> f64 {
    10.0 * (jam_power_w.max(1e-30) / rx_power_w.max(1e-30)).log10()
}

/// Degradation a given J/S ratio imposes: `(kills, extra_packet_loss)`.
pub fn js_degradation(js_db: f64) -> (bool, f64) {
    if js_db > 0.0 {
        (true, 1.0)
    } else if js_db > -6.0 {
        (false, 0.3)
    } else {
        (false, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barrage(range_m: f64) -> Jammer {
        Jammer {
            id: "j1".to_string(),
            jammer_type: JammerType::Barrage,
            direction: JamDirection::Both,
            position: Position::new(0.0, 0.0, 0.0),
            power_dbw: 30.0,
            freq_min_hz: 1e9,
            freq_max_hz: 3e9,
            range_m,
            active: true,
        }
    }

    #[test]
    fn out_of_range_jammer_contributes_nothing() {
        let j = barrage(1000.0);
        let target = Position::new(50_000.0, 0.0, 0.0);
        assert!(jam_power_w(&j, &target, 2e9, true).is_none());
    }

    #[test]
    fn out_of_band_jammer_contributes_nothing() {
        let j = barrage(100_000.0);
        let target = Position::new(5_000.0, 0.0, 0.0);
        assert!(jam_power_w(&j, &target, 5e9, true).is_none());
    }

    #[test]
    fn js_above_zero_kills_link() {
        let (kills, loss) = js_degradation(3.0);
        assert!(kills);
        assert_eq!(loss, 1.0);
    }

    #[test]
    fn js_between_minus6_and_zero_degrades() {
        let (kills, loss) = js_degradation(-3.0);
        assert!(!kills);
        assert!((loss - 0.3).abs() < 1e-9);
    }
}
