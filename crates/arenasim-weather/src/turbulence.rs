//! Turbulence gusts.("numerical determinism for MC"),
//! every draw takes an explicit `&mut ChaCha8Rng` — never a global RNG —
//! so a replication's gust sequence is reproducible from its seed alone.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy)]
pub struct TurbulenceConfig {
    /// Gust standard deviation at sea level, m/s.
    pub base_intensity_mps: f64,
    /// Multiplier applied per meter of altitude (turbulence generally
    /// weakens above the boundary layer; this lets scenarios tune it).
    pub altitude_falloff_per_m: f64,
}

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self { base_intensity_mps: 1.5, altitude_falloff_per_m: 1.0 / 12_000.0 }
    }
}

/// One instantaneous gust sample: perturbations to speed and gamma.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gust {
    pub d_speed: f64,
    pub d_gamma: f64,
}

/// Draw one gust sample for an entity at a given altitude and aero_blend,
/// consuming the provided RNG. Returns a zero gust above the sensible
/// atmosphere (`aero_blend <= 0`) since there is no air to be turbulent.
pub fn sample_gust(rng: &mut ChaCha8Rng, cfg: &TurbulenceConfig, alt_m: f64, aero_blend: f64) -> Gust {
    if aero_blend <= 0.0 {
        return Gust::default();
    }
    let falloff = (1.0 - alt_m * cfg.altitude_falloff_per_m).clamp(0.0, 1.0);
    let sigma = cfg.base_intensity_mps * falloff * aero_blend;
    if sigma <= 0.0 {
        return Gust::default();
    }
    // Box-Muller transform for a standard-normal sample from two uniforms.
    let u1: f64 = rng.r#gen::<f64>().max(1e-12);
    let u2: f64 = rng.r#gen;
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    Gust { d_speed: z * sigma, d_gamma: z * sigma * 0.001 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn deterministic_for_same_seed() {
        let cfg = TurbulenceConfig::default();
        let mut rng1 = ChaCha8Rng::seed_from_u64(7);
        let mut rng2 = ChaCha8Rng::seed_from_u64(7);
        let g1 = sample_gust(&mut rng1, &cfg, 1000.0, 1.0);
        let g2 = sample_gust(&mut rng2, &cfg, 1000.0, 1.0);
        assert_eq!(g1.d_speed, g2.d_speed);
    }

    #[test]
    fn zero_above_atmosphere() {
        let cfg = TurbulenceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let g = sample_gust(&mut rng, &cfg, 100_000.0, 0.0);
        assert_eq!(g.d_speed, 0.0);
    }

    #[test]
    fn weakens_with_altitude() {
        let cfg = TurbulenceConfig::default();
        let mut rng1 = ChaCha8Rng::seed_from_u64(3);
        let mut rng2 = rng1.clone();
        let low = sample_gust(&mut rng1, &cfg, 0.0, 1.0);
        let high = sample_gust(&mut rng2, &cfg, 11_000.0, 1.0);
        assert!(high.d_speed.abs() <= low.d_speed.abs() + 1e-9);
    }
}
