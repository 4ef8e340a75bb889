//! Weather model: a layered wind stack, cloud layers, turbulence gusts,
//! and a terrain elevation cache., this is an explicitly
//! owned, constructed-at-start subsystem — no module-level singleton.

pub mod clouds;
pub mod terrain;
pub mod turbulence;
pub mod wind;

use clouds::CloudLayer;
use terrain::TerrainCache;
use turbulence::TurbulenceConfig;
use wind::WindStack;

/// The full weather model for one simulation instance.
#[derive(Debug, Clone)]
pub struct WeatherModel {
    pub wind: WindStack,
    pub clouds: Vec<CloudLayer>,
    pub turbulence: TurbulenceConfig,
    pub terrain: TerrainCache,
}

impl Default for WeatherModel {
    fn default() -> Self {
        Self {
            wind: WindStack::default(),
            clouds: Vec::new(),
            turbulence: TurbulenceConfig::default(),
            terrain: TerrainCache::flat(),
        }
    }
}

impl WeatherModel {
    /// Cloud condition affecting a given altitude.
    pub fn cloud_condition_at(&self, alt_m: f64) -> clouds::CloudCondition {
        clouds::condition_at(&self.clouds, alt_m)
    }
}
