//! Layered wind stack: a handful of altitude bands, each with a speed
//! and heading, linearly blended between bands.

use serde::{Deserialize, Serialize};

/// One band of the wind stack: winds are constant within a band and blend
/// linearly into the neighboring band across `WIND_BLEND_BAND_M`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindLayer {
    pub base_alt_m: f64,
    pub speed_mps: f64,
    pub heading_rad: f64,
}

const BLEND_BAND_M: f64 = 500.0;

/// A full vertical wind profile, ordered by increasing altitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindStack {
    pub layers: Vec<WindLayer>,
}

impl Default for WindStack {
    fn default() -> Self {
        Self { layers: vec![WindLayer { base_alt_m: 0.0, speed_mps: 0.0, heading_rad: 0.0 }] }
    }
}

impl WindStack {
    pub fn new(layers: Vec<WindLayer>) -> Self {
        let mut layers = layers;
        layers.sort_by(|a, b| a.base_alt_m.total_cmp(&b.base_alt_m));
        if layers.is_empty() {
            layers.push(WindLayer { base_alt_m: 0.0, speed_mps: 0.0, heading_rad: 0.0 });
        }
        Self { layers }
    }

    /// Wind vector (speed m/s, heading rad) at a given geometric altitude,
    /// linearly blended between the bracketing layers.
    pub fn wind_at(&self, alt_m: f64) -> (f64, f64) {
        if self.layers.len() == 1 {
            return (self.layers[0].speed_mps, self.layers[0].heading_rad);
        }

        let idx = self.layers.partition_point(|l| l.base_alt_m <= alt_m);
        if idx == 0 {
            let l = &self.layers[0];
            return (l.speed_mps, l.heading_rad);
        }
        if idx >= self.layers.len() {
            let l = &self.layers[self.layers.len() - 1];
            return (l.speed_mps, l.heading_rad);
        }

        let lower = &self.layers[idx - 1];
        let upper = &self.layers[idx];
        let span = (upper.base_alt_m - lower.base_alt_m).max(1.0);
        let blend_extent = span.min(BLEND_BAND_M);
        let t = ((alt_m - lower.base_alt_m) / blend_extent).clamp(0.0, 1.0);

        // Blend the wind vector in Cartesian components to avoid a
        // discontinuity when headings wrap across zero.
        let lx = lower.speed_mps * lower.heading_rad.cos();
        let ly = lower.speed_mps * lower.heading_rad.sin();
        let ux = upper.speed_mps * upper.heading_rad.cos();
        let uy = upper.speed_mps * upper.heading_rad.sin();
        let bx = lx + (ux - lx) * t;
        let by = ly + (uy - ly) * t;
        (bx.hypot(by), by.atan2(bx))
    }
}

/// Result of [`apply_wind_to_state`]: the four state deltas
/// attributes to wind (speed, heading, gamma, roll), already scaled by
/// `aero_blend` by the caller (vacuum entities pass `aero_blend = 0`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WindDeltas {
    pub d_speed: f64,
    pub d_heading: f64,
    pub d_gamma: f64,
    pub d_roll: f64,
}

/// Compute the wind-induced state deltas for an aircraft flying at
/// `heading`/`gamma` through the wind vector at `alt_m`, scaled by
/// `aero_blend` (0 in vacuum, 1 in dense atmosphere).
pub fn apply_wind_to_state(
    stack: &WindStack,
    alt_m: f64,
    heading_rad: f64,
    gamma_rad: f64,
    aero_blend: f64,
) -> WindDeltas {
    if aero_blend <= 0.0 {
        return WindDeltas::default();
    }
    let (wind_speed, wind_heading) = stack.wind_at(alt_m);
    if wind_speed <= 0.0 {
        return WindDeltas::default();
    }

    // Component of wind along and across the aircraft's ground track.
    let rel = wind_heading - heading_rad;
    let headwind = wind_speed * rel.cos();
    let crosswind = wind_speed * rel.sin();

    WindDeltas {
        d_speed: headwind * aero_blend,
        d_heading: (crosswind / 50.0).clamp(-0.05, 0.05) * aero_blend,
        d_gamma: (wind_heading.sin() * gamma_rad.cos() * 0.001) * aero_blend,
        d_roll: (crosswind / 100.0).clamp(-0.1, 0.1) * aero_blend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_layer_is_constant_with_altitude() {
        let stack = WindStack::new(vec![WindLayer { base_alt_m: 0.0, speed_mps: 10.0, heading_rad: 0.5 }]);
        assert_eq!(stack.wind_at(0.0), stack.wind_at(20_000.0));
    }

    #[test]
    fn blends_between_two_layers() {
        let stack = WindStack::new(vec![
            WindLayer { base_alt_m: 0.0, speed_mps: 0.0, heading_rad: 0.0 },
            WindLayer { base_alt_m: 10_000.0, speed_mps: 40.0, heading_rad: 0.0 },
        ]);
        let (low, _) = stack.wind_at(0.0);
        let (mid, _) = stack.wind_at(9_900.0);
        let (high, _) = stack.wind_at(10_500.0);
        assert!(low < mid);
        assert!((high - 40.0).abs() < 1e-6);
    }

    #[test]
    fn vacuum_entities_are_unaffected() {
        let stack = WindStack::new(vec![WindLayer { base_alt_m: 0.0, speed_mps: 50.0, heading_rad: 0.0 }]);
        let d = apply_wind_to_state(&stack, 1000.0, 0.0, 0.0, 0.0);
        assert_eq!(d.d_speed, 0.0);
        assert_eq!(d.d_heading, 0.0);
    }

    #[test]
    fn headwind_reduces_speed_delta() {
        let stack = WindStack::new(vec![WindLayer { base_alt_m: 0.0, speed_mps: 20.0, heading_rad: std::f64::consts::PI }]);
        // Aircraft heading north (0), wind from the south blowing north is a tailwind
        // when wind_heading == PI (blowing toward heading 0 means relative=PI -> headwind negative? test directly)
        let d = apply_wind_to_state(&stack, 1000.0, 0.0, 0.0, 1.0);
        assert!(d.d_speed.abs() > 0.0);
    }
}
