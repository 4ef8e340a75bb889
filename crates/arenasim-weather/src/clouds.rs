//! Cloud cover layers: an altitude band with coverage fraction and base
//! height, rather than a single global condition enum.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudCondition {
    Clear,
    Scattered,
    Overcast,
    Storm,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CloudLayer {
    pub base_alt_m: f64,
    pub top_alt_m: f64,
    pub condition: CloudCondition,
}

/// Fraction of sky covered, used by sensor/visual systems to attenuate
/// detection and glow effects (grounded on `weather::glow_visibility`
/// and `weather::radar_multiplier`).
impl CloudCondition {
    pub fn coverage_fraction(&self) -> f64 {
        match self {
            CloudCondition::Clear => 0.0,
            CloudCondition::Scattered => 0.35,
            CloudCondition::Overcast => 0.85,
            CloudCondition::Storm => 1.0,
        }
    }

    /// Radar detection-range multiplier under this condition.
    pub fn radar_multiplier(&self) -> f64 {
        match self {
            CloudCondition::Clear => 1.0,
            CloudCondition::Scattered => 0.9,
            CloudCondition::Overcast => 0.7,
            CloudCondition::Storm => 0.45,
        }
    }

    /// Reentry-glow visibility multiplier under this condition; 0 means
    /// the glow is invisible from the ground.
    pub fn glow_visibility(&self) -> f64 {
        match self {
            CloudCondition::Clear => 1.0,
            CloudCondition::Scattered => 0.6,
            CloudCondition::Overcast => 0.1,
            CloudCondition::Storm => 0.0,
        }
    }
}

/// Does a geometric altitude fall within this cloud layer's band?
pub fn layer_contains(layer: &CloudLayer, alt_m: f64) -> bool {
    alt_m >= layer.base_alt_m && alt_m <= layer.top_alt_m
}

/// Worst (most obscuring) condition affecting a given altitude, across
/// all configured layers; `Clear` if no layer covers that altitude.
pub fn condition_at(layers: &[CloudLayer], alt_m: f64) -> CloudCondition {
    layers
        .iter()
        .filter(|l| layer_contains(l, alt_m))
        .map(|l| l.condition)
        .max_by_key(|c| (c.coverage_fraction() * 1000.0) as i64)
        .unwrap_or(CloudCondition::Clear)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_layers_is_clear() {
        assert_eq!(condition_at(&[], 5000.0), CloudCondition::Clear);
    }

    #[test]
    fn altitude_outside_band_is_clear() {
        let layers = vec![CloudLayer { base_alt_m: 3000.0, top_alt_m: 6000.0, condition: CloudCondition::Storm }];
        assert_eq!(condition_at(&layers, 10_000.0), CloudCondition::Clear);
        assert_eq!(condition_at(&layers, 4000.0), CloudCondition::Storm);
    }

    #[test]
    fn storm_blocks_glow_and_degrades_radar() {
        assert_eq!(CloudCondition::Storm.glow_visibility(), 0.0);
        assert!(CloudCondition::Storm.radar_multiplier() < CloudCondition::Clear.radar_multiplier());
    }
}
