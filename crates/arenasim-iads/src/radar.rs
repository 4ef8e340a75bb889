//! Radar scan/track model: EW rotates continuously, TTR/FCR slew onto an
//! assigned target.

use arenasim_core::constants::EARTH_RADIUS_M;
use arenasim_core::enums::{RadarState, RadarType};
use arenasim_core::EntityId;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy)]
pub struct RadarConfig {
    pub kind: RadarType,
    /// EW: full-rotation rate, rad/s. TTR/FCR: slew rate, rad/s.
    pub rotation_rate_rad_s: f64,
    pub beamwidth_rad: f64,
    pub max_range_m: f64,
    pub track_accuracy_m: f64,
}

#[derive(Debug, Clone)]
pub struct RadarUnit {
    pub config: RadarConfig,
    pub azimuth_rad: f64,
    pub state: RadarState,
    pub assigned_target: Option<EntityId>,
}

impl RadarUnit {
    pub fn new(config: RadarConfig) -> Self {
        Self { config, azimuth_rad: 0.0, state: RadarState::Scanning, assigned_target: None }
    }

    /// Advance the beam one tick. EW rotates continuously; TTR/FCR slew
    /// toward `target_bearing_rad` when a target is assigned.
    pub fn step(&mut self, dt: f64, target_bearing_rad: Option<f64>) {
        match self.config.kind {
            RadarType::Ew => {
                self.azimuth_rad = (self.azimuth_rad + self.config.rotation_rate_rad_s * dt).rem_euclid(TAU);
            }
            RadarType::Ttr | RadarType::Fcr => {
                let Some(target) = target_bearing_rad else { return };
                let diff = angular_diff(target, self.azimuth_rad);
                let max_step = self.config.rotation_rate_rad_s * dt;
                let step = diff.clamp(-max_step, max_step);
                self.azimuth_rad = (self.azimuth_rad + step).rem_euclid(TAU);
            }
        }
    }

    /// Whether a target at `bearing_rad`/`range_m` falls within this
    /// radar's detection window for its current mode.
    pub fn can_detect(&self, bearing_rad: f64, range_m: f64) -> bool {
        if range_m > self.config.max_range_m {
            return false;
        }
        let half_width = match (self.config.kind, self.state) {
            (RadarType::Ew, _) => self.config.beamwidth_rad / 2.0,
            (RadarType::Ttr | RadarType::Fcr, RadarState::Tracking) => 2.0 * self.config.beamwidth_rad,
            (RadarType::Ttr | RadarType::Fcr, RadarState::Scanning) => self.config.beamwidth_rad / 2.0,
        };
        angular_diff(bearing_rad, self.azimuth_rad).abs() <= half_width
    }
}

/// Smallest signed angular difference `a - b`, wrapped to [-pi, pi].
fn angular_diff(a: f64, b: f64) -> f64 {
    let mut d = (a - b).rem_euclid(TAU);
    if d > std::f64::consts::PI {
        d -= TAU;
    }
    d
}

/// Apply Gaussian position noise scaled by `track_accuracy_m`, converted
/// from meters to radians of lat/lon at Earth's mean radius.
pub fn noisy_report(rng: &mut ChaCha8Rng, lat: f64, lon: f64, track_accuracy_m: f64) -> (f64, f64) {
    if track_accuracy_m <= 0.0 {
        return (lat, lon);
    }
    let sigma_rad = track_accuracy_m / EARTH_RADIUS_M;
    let u1: f64 = rng.r#gen::<f64>().max(1e-12);
    let u2: f64 = rng.r#gen::<f64>();
    let r = (-2.0 * u1.ln()).sqrt();
    let z0 = r * (TAU * u2).cos();
    let z1 = r * (TAU * u2).sin();
    (lat + z0 * sigma_rad, lon + z1 * sigma_rad / lat.cos().max(1e-6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ew_config() -> RadarConfig {
        RadarConfig {
            kind: RadarType::Ew,
            rotation_rate_rad_s: 0.5,
            beamwidth_rad: 0.1,
            max_range_m: 400_000.0,
            track_accuracy_m: 100.0,
        }
    }

    #[test]
    fn ew_rotates_continuously() {
        let mut radar = RadarUnit::new(ew_config());
        radar.step(1.0, None);
        assert!((radar.azimuth_rad - 0.5).abs() < 1e-9);
    }

    #[test]
    fn out_of_beamwidth_is_not_detected() {
        let radar = RadarUnit::new(ew_config());
        assert!(!radar.can_detect(1.0, 10_000.0));
        assert!(radar.can_detect(0.01, 10_000.0));
    }

    #[test]
    fn tracking_ttr_has_widened_window() {
        let mut cfg = ew_config();
        cfg.kind = RadarType::Ttr;
        let mut radar = RadarUnit::new(cfg);
        radar.state = RadarState::Tracking;
        assert!(radar.can_detect(0.15, 10_000.0));
    }

    #[test]
    fn noisy_report_is_deterministic_for_same_seed() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        let a = noisy_report(&mut rng1, 0.5, 0.5, 100.0);
        let b = noisy_report(&mut rng2, 0.5, 0.5, 100.0);
        assert_eq!(a, b);
    }
}
