//! Link budget: FSPL, atmospheric and rain attenuation, thermal noise
//! floor, and quality classification.

use arenasim_core::constants::SPEED_OF_LIGHT_MPS;
use arenasim_core::enums::{LinkQuality, LinkType};

const SHANNON_REFERENCE_SNIR_DB: f64 = 20.0;

/// Free-space path loss, dB. `distance_m` and `freq_hz` are SI units.
pub fn fspl_db(distance_m: f64, freq_hz: f64) -> f64 {
    let d = distance_m.max(1.0);
    let f = freq_hz.max(1.0);
    20.0 * d.log10() + 20.0 * f.log10() + 20.0 * (4.0 * std::f64::consts::PI / SPEED_OF_LIGHT_MPS).log10()
}

/// Atmospheric attenuation, dB/km, by frequency band (0.005-0.2 dB/km
/// across 1-100 GHz), scaled by the fraction of the path within the
/// troposphere.
pub fn atmospheric_attenuation_db(distance_m: f64, freq_ghz: f64, tropospheric_fraction: f64) -> f64 {
    let f = freq_ghz.clamp(1.0, 100.0);
    let t = (f - 1.0) / 99.0;
    let db_per_km = 0.005 + t * (0.2 - 0.005);
    db_per_km * (distance_m / 1000.0) * tropospheric_fraction.clamp(0.0, 1.0)
}

/// Simplified ITU-R P.838 rain-fade model: `fade = k * rain_rate^alpha`
/// per km, with `k`/`alpha` coarse functions of frequency.
pub fn rain_fade_db(distance_m: f64, freq_ghz: f64, rain_rate_mm_per_hr: f64) -> f64 {
    if rain_rate_mm_per_hr <= 0.0 {
        return 0.0;
    }
    let f = freq_ghz.max(1.0);
    let k = 0.0001 * f.powf(1.6);
    let alpha = 1.0 - (f / 200.0).min(0.3);
    let db_per_km = k * rain_rate_mm_per_hr.powf(alpha);
    db_per_km * (distance_m / 1000.0)
}

/// Thermal noise floor, dBW, over bandwidth `bandwidth_hz` at
/// temperature `temp_k`.
pub fn thermal_noise_floor_dbw(temp_k: f64, bandwidth_hz: f64) -> f64 {
    -228.6 + 10.0 * temp_k.max(1.0).log10() + 10.0 * bandwidth_hz.max(1.0).log10()
}

/// Transmitter/receiver parameters for an RF link budget calculation.
#[derive(Debug, Clone, Copy)]
pub struct RfLinkParams {
    pub tx_power_dbm: f64,
    pub tx_gain_db: f64,
    pub rx_gain_db: f64,
    pub receiver_sensitivity_dbm: f64,
    pub freq_hz: f64,
    pub bandwidth_hz: f64,
    pub temp_k: f64,
    pub tropospheric_fraction: f64,
    pub rain_rate_mm_per_hr: f64,
}

/// The resolved physical state of one link at one tick.
#[derive(Debug, Clone, Copy)]
pub struct LinkBudgetResult {
    pub received_power_dbm: f64,
    pub noise_floor_dbw: f64,
    pub snir_db: f64,
    pub margin_db: f64,
    pub quality: LinkQuality,
}

pub fn quality_from_margin(margin_db: f64) -> LinkQuality {
    if margin_db > 20.0 {
        LinkQuality::Excellent
    } else if margin_db > 10.0 {
        LinkQuality::Good
    } else if margin_db > 0.0 {
        LinkQuality::Degraded
    } else {
        LinkQuality::Lost
    }
}

/// Evaluate an RF link budget with jammer noise (watts, linear) already
/// summed in by the caller (see `jammer::total_jam_power_w`).
pub fn evaluate_rf(params: &RfLinkParams, distance_m: f64, jam_power_w: f64) -> LinkBudgetResult {
    let freq_ghz = params.freq_hz / 1e9;
    let fspl = fspl_db(distance_m, params.freq_hz);
    let atmos = atmospheric_attenuation_db(distance_m, freq_ghz, params.tropospheric_fraction);
    let rain = rain_fade_db(distance_m, freq_ghz, params.rain_rate_mm_per_hr);

    let received_power_dbm =
        params.tx_power_dbm + params.tx_gain_db + params.rx_gain_db - fspl - atmos - rain;

    let thermal_dbw = thermal_noise_floor_dbw(params.temp_k, params.bandwidth_hz);
    let thermal_w = 10f64.powf(thermal_dbw / 10.0);
    let total_noise_w = thermal_w + jam_power_w.max(0.0);
    let noise_floor_dbw = 10.0 * total_noise_w.max(1e-30).log10();

    let received_power_dbw = received_power_dbm - 30.0;
    let snir_db = received_power_dbw - noise_floor_dbw;
    let margin_db = received_power_dbm - params.receiver_sensitivity_dbm;

    LinkBudgetResult {
        received_power_dbm,
        noise_floor_dbw,
        snir_db,
        margin_db,
        quality: quality_from_margin(margin_db),
    }
}

/// Effective data rate: capacity scaled by a Shannon-like factor of
/// SNIR, referenced against `SHANNON_REFERENCE_SNIR_DB`.
pub fn effective_data_rate_bps(capacity_bps: f64, snir_db: f64) -> f64 {
    let snir_linear = 10f64.powf(snir_db / 10.0);
    let reference_linear = 10f64.powf(SHANNON_REFERENCE_SNIR_DB / 10.0);
    let factor = ((1.0 + snir_linear).log2() / (1.0 + reference_linear).log2()).clamp(0.0, 1.0);
    capacity_bps * factor
}

/// Fiber link: LOS-independent, immune to jamming, fixed bandwidth.
pub fn fiber_latency_s(distance_m: f64) -> f64 {
    distance_m / SPEED_OF_LIGHT_MPS + arenasim_core::constants::FIBER_LATENCY_FIXED_MS / 1000.0
}

/// Laser link atmospheric penalty: exponential below 10 km altitude,
/// zero above (space-to-space or above-cloud laser links are clean).
pub fn laser_atmospheric_penalty_db(altitude_m: f64) -> f64 {
    const SCALE_HEIGHT_M: f64 = 3000.0;
    if altitude_m >= 10_000.0 {
        0.0
    } else {
        15.0 * (-(altitude_m.max(0.0)) / SCALE_HEIGHT_M).exp()
    }
}

/// Classify a link's effective type from its endpoints' LOS state.
pub fn resolves_with_los(link_type: LinkType) -> bool {
    matches!(link_type, LinkType::Rf | LinkType::Laser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fspl_is_monotonic_in_distance_and_frequency() {
        let base = fspl_db(10_000.0, 1e9);
        assert!(fspl_db(20_000.0, 1e9) > base);
        assert!(fspl_db(10_000.0, 2e9) > base);
    }

    #[test]
    fn quality_thresholds_match_spec() {
        assert_eq!(quality_from_margin(25.0), LinkQuality::Excellent);
        assert_eq!(quality_from_margin(15.0), LinkQuality::Good);
        assert_eq!(quality_from_margin(5.0), LinkQuality::Degraded);
        assert_eq!(quality_from_margin(-5.0), LinkQuality::Lost);
    }

    #[test]
    fn jammer_noise_degrades_link() {
        let params = RfLinkParams {
            tx_power_dbm: 40.0,
            tx_gain_db: 10.0,
            rx_gain_db: 10.0,
            receiver_sensitivity_dbm: -100.0,
            freq_hz: 2.4e9,
            bandwidth_hz: 1e6,
            temp_k: 290.0,
            tropospheric_fraction: 0.3,
            rain_rate_mm_per_hr: 0.0,
        };
        let clean = evaluate_rf(&params, 50_000.0, 0.0);
        let jammed = evaluate_rf(&params, 50_000.0, 1e-6);
        assert!(jammed.snir_db < clean.snir_db);
    }

    #[test]
    fn effective_rate_scales_with_snir() {
        let low = effective_data_rate_bps(1e6, 0.0);
        let high = effective_data_rate_bps(1e6, 25.0);
        assert!(high > low);
        assert!(high <= 1e6 + 1.0);
    }

    #[test]
    fn laser_penalty_vanishes_above_10km() {
        assert_eq!(laser_atmospheric_penalty_db(15_000.0), 0.0);
        assert!(laser_atmospheric_penalty_db(0.0) > laser_atmospheric_penalty_db(9_000.0));
    }
}
