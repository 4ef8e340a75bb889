//! US-1976 Standard Atmosphere model.
//!
//! Piecewise layer model from sea level to 71 km, an exponential-decay
//! extension above 84,852 m, and the Mach / CAS / TAS conversions the
//! flight propagator needs.

use arenasim_core::constants::{AIR_GAMMA, AIR_GAS_CONSTANT, G0, GEOPOTENTIAL_EARTH_RADIUS_M};

/// One layer of the piecewise atmosphere: base geopotential altitude (m),
/// base temperature (K), lapse rate (K/m, negative = cooling with altitude),
/// and base pressure (Pa), precomputed so each layer can be evaluated
/// independently of the ones below it.
struct Layer {
    base_alt_m: f64,
    base_temp_k: f64,
    lapse_rate: f64,
    base_pressure_pa: f64,
}

const LAYERS: [Layer; 7] = [
    Layer { base_alt_m: 0.0, base_temp_k: 288.15, lapse_rate: -0.0065, base_pressure_pa: 101_325.0 },
    Layer { base_alt_m: 11_000.0, base_temp_k: 216.65, lapse_rate: 0.0, base_pressure_pa: 22_632.1 },
    Layer { base_alt_m: 20_000.0, base_temp_k: 216.65, lapse_rate: 0.001, base_pressure_pa: 5_474.89 },
    Layer { base_alt_m: 32_000.0, base_temp_k: 228.65, lapse_rate: 0.0028, base_pressure_pa: 868.019 },
    Layer { base_alt_m: 47_000.0, base_temp_k: 270.65, lapse_rate: 0.0, base_pressure_pa: 110.906 },
    Layer { base_alt_m: 51_000.0, base_temp_k: 270.65, lapse_rate: -0.0028, base_pressure_pa: 66.9389 },
    Layer { base_alt_m: 71_000.0, base_temp_k: 214.65, lapse_rate: -0.002, base_pressure_pa: 3.95642 },
];

/// Altitude (geopotential, meters) above which the piecewise layer table
/// ends; beyond this the model switches to an exponential density decay.
const EXPONENTIAL_REGIME_ALT_M: f64 = 84_852.0;
const EXPONENTIAL_SCALE_HEIGHT_M: f64 = 8_500.0;

/// Sea-level density, kg/m^3, used to anchor the exponential regime.
const RHO0: f64 = 1.225;

/// Convert geometric altitude (meters above mean sea level) to geopotential
/// altitude using the effective Earth radius.
pub fn geopotential_altitude(geometric_alt_m: f64) -> f64 {
    GEOPOTENTIAL_EARTH_RADIUS_M * geometric_alt_m / (GEOPOTENTIAL_EARTH_RADIUS_M + geometric_alt_m)
}

fn layer_for(h: f64) -> &'static Layer {
    LAYERS
        .iter()
        .rev()
        .find(|l| h >= l.base_alt_m)
        .unwrap_or(&LAYERS[0])
}

/// Temperature (Kelvin) at a given geometric altitude.
pub fn temperature(geometric_alt_m: f64) -> f64 {
    let h = geopotential_altitude(geometric_alt_m).min(LAYERS[6].base_alt_m.max(0.0));
    let h = if geometric_alt_m > EXPONENTIAL_REGIME_ALT_M {
        geopotential_altitude(EXPONENTIAL_REGIME_ALT_M)
    } else {
        h
    };
    let layer = layer_for(h);
    layer.base_temp_k + layer.lapse_rate * (h - layer.base_alt_m)
}

/// Pressure (Pa) at a given geometric altitude.
pub fn pressure(geometric_alt_m: f64) -> f64 {
    if geometric_alt_m > EXPONENTIAL_REGIME_ALT_M {
        // Pressure isn't separately modeled above the layer table; derive
        // it from the exponential density via the ideal gas law so callers
        // that need it stay self-consistent with `density`.
        let rho = density(geometric_alt_m);
        let t = temperature(geometric_alt_m);
        return rho * AIR_GAS_CONSTANT * t;
    }
    let h = geopotential_altitude(geometric_alt_m);
    let layer = layer_for(h);
    let dh = h - layer.base_alt_m;
    if layer.lapse_rate.abs() < 1e-12 {
        layer.base_pressure_pa * (-G0 * dh / (AIR_GAS_CONSTANT * layer.base_temp_k)).exp()
    } else {
        let base = layer.base_temp_k / (layer.base_temp_k + layer.lapse_rate * dh);
        layer.base_pressure_pa * base.powf(G0 / (AIR_GAS_CONSTANT * layer.lapse_rate))
    }
}

/// Air density (kg/m^3) at a given geometric altitude.
pub fn density(geometric_alt_m: f64) -> f64 {
    if geometric_alt_m > EXPONENTIAL_REGIME_ALT_M {
        let rho_84852 = layer_table_density(EXPONENTIAL_REGIME_ALT_M);
        let dh = geometric_alt_m - EXPONENTIAL_REGIME_ALT_M;
        return rho_84852 * (-dh / EXPONENTIAL_SCALE_HEIGHT_M).exp();
    }
    layer_table_density(geometric_alt_m)
}

fn layer_table_density(geometric_alt_m: f64) -> f64 {
    let p = {
        let h = geopotential_altitude(geometric_alt_m);
        let layer = layer_for(h);
        let dh = h - layer.base_alt_m;
        if layer.lapse_rate.abs() < 1e-12 {
            layer.base_pressure_pa * (-G0 * dh / (AIR_GAS_CONSTANT * layer.base_temp_k)).exp()
        } else {
            let base = layer.base_temp_k / (layer.base_temp_k + layer.lapse_rate * dh);
            layer.base_pressure_pa * base.powf(G0 / (AIR_GAS_CONSTANT * layer.lapse_rate))
        }
    };
    let t = temperature(geometric_alt_m);
    p / (AIR_GAS_CONSTANT * t)
}

/// Speed of sound (m/s) at a given geometric altitude.
pub fn speed_of_sound(geometric_alt_m: f64) -> f64 {
    (AIR_GAMMA * AIR_GAS_CONSTANT * temperature(geometric_alt_m)).sqrt()
}

/// Mach number for a true airspeed (m/s) at a given altitude.
pub fn mach(tas_mps: f64, geometric_alt_m: f64) -> f64 {
    tas_mps / speed_of_sound(geometric_alt_m)
}

/// Convert true airspeed to calibrated airspeed using the compressible
/// pitot-static relation referenced to sea-level conditions.
pub fn cas_from_tas(tas_mps: f64, geometric_alt_m: f64) -> f64 {
    let p = pressure(geometric_alt_m);
    let p0 = LAYERS[0].base_pressure_pa;
    let rho0 = RHO0;
    let m = mach(tas_mps, geometric_alt_m);
    if m.abs() < 1e-9 {
        return 0.0;
    }
    let gamma = AIR_GAMMA;
    let qc = p * ((1.0 + (gamma - 1.0) / 2.0 * m * m).powf(gamma / (gamma - 1.0)) - 1.0);
    let term = 1.0 + qc / p0;
    let cas_ratio = (2.0 / (gamma - 1.0)) * (term.powf((gamma - 1.0) / gamma) - 1.0);
    (cas_ratio.max(0.0) * (gamma * p0 / rho0)).sqrt()
}

/// Convert calibrated airspeed to true airspeed by numeric inversion of
/// [`cas_from_tas`] (bisection — the closed form isn't needed at the
/// precision a flight propagator requires).
pub fn tas_from_cas(cas_mps: f64, geometric_alt_m: f64) -> f64 {
    if cas_mps.abs() < 1e-9 {
        return 0.0;
    }
    let mut lo = 0.0_f64;
    let mut hi = cas_mps * 3.0 + 50.0;
    for _ in 0..60 {
        let mid = (lo + hi) / 2.0;
        if cas_from_tas(mid, geometric_alt_m) < cas_mps {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_matches_standard_values() {
        assert!((density(0.0) - 1.225).abs() < 0.001);
        assert!((pressure(0.0) - 101_325.0).abs() < 1.0);
        assert!((temperature(0.0) - 288.15).abs() < 0.01);
        assert!((speed_of_sound(0.0) - 340.29).abs() < 0.5);
    }

    #[test]
    fn tropopause_matches_standard_values() {
        // At 11 km the standard atmosphere gives ~216.65 K, ~22,632 Pa.
        assert!((temperature(11_000.0) - 216.65).abs() < 0.1);
        assert!((pressure(11_000.0) - 22_632.1).abs() / 22_632.1 < 0.01);
    }

    #[test]
    fn density_decreases_monotonically_with_altitude() {
        let mut prev = density(0.0);
        for alt in (1_000..120_000).step_by(1_000) {
            let d = density(alt as f64);
            assert!(d < prev, "density should decrease with altitude at {alt}m");
            prev = d;
        }
    }

    #[test]
    fn exponential_regime_continuous_with_layer_table() {
        let below = density(EXPONENTIAL_REGIME_ALT_M - 1.0);
        let above = density(EXPONENTIAL_REGIME_ALT_M + 1.0);
        assert!((below - above).abs() / below < 0.01);
    }

    #[test]
    fn mach_one_at_speed_of_sound() {
        let alt = 5_000.0;
        let a = speed_of_sound(alt);
        assert!((mach(a, alt) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cas_tas_round_trip() {
        let alt = 8_000.0;
        let tas = 230.0;
        let cas = cas_from_tas(tas, alt);
        let back = tas_from_cas(cas, alt);
        assert!((back - tas).abs() < 0.05, "round trip: tas={tas} back={back}");
    }

    #[test]
    fn cas_lower_than_tas_at_altitude() {
        // At altitude the lower density makes CAS read lower than TAS.
        let alt = 10_000.0;
        let tas = 250.0;
        assert!(cas_from_tas(tas, alt) < tas);
    }
}
