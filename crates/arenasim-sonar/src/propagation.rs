//! Transmission loss (TL) and ambient noise (NL).

use arenasim_core::constants::{SONAR_CONVERGENCE_ZONE_M, SONAR_CZ_WINDOW_M};

/// Simplified Thorp absorption coefficient, dB/km, for frequency `f_khz`.
pub fn thorp_absorption_db_per_km(f_khz: f64) -> f64 {
    let f2 = f_khz * f_khz;
    0.11 * f2 / (1.0 + f2) + 44.0 * f2 / (4100.0 + f2) + 2.75e-4 * f2 + 0.003
}

/// Geometry and environment inputs to the transmission-loss model.
#[derive(Debug, Clone, Copy)]
pub struct PropagationContext {
    pub range_m: f64,
    pub frequency_khz: f64,
    pub thermocline_depth_m: f64,
    pub listener_depth_m: f64,
    pub target_depth_m: f64,
    pub surface_duct_enabled: bool,
}

/// Transmission loss in dB for the given geometry.
pub fn transmission_loss_db(ctx: &PropagationContext) -> f64 {
    let range_km = (ctx.range_m / 1000.0).max(1e-3);
    let absorption = thorp_absorption_db_per_km(ctx.frequency_khz) * range_km;

    let both_shallow = ctx.listener_depth_m < 50.0 && ctx.target_depth_m < 50.0;
    let spreading = if ctx.surface_duct_enabled && both_shallow && ctx.range_m > 1000.0 {
        10.0 * (ctx.range_m).log10()
    } else {
        20.0 * (ctx.range_m).log10()
    };

    let mut tl = spreading + absorption;

    let opposite_sides = (ctx.listener_depth_m < ctx.thermocline_depth_m)
        != (ctx.target_depth_m < ctx.thermocline_depth_m);
    if opposite_sides {
        tl += 20.0;
        let nearest_multiple = (ctx.range_m / SONAR_CONVERGENCE_ZONE_M).round() * SONAR_CONVERGENCE_ZONE_M;
        if (ctx.range_m - nearest_multiple).abs() <= SONAR_CZ_WINDOW_M {
            tl -= 15.0;
        }
    }

    tl
}

/// Ambient noise level in dB for the given sea state (0-9).
pub fn ambient_noise_db(sea_state: u8) -> f64 {
    60.0 + 5.0 * sea_state as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(range_m: f64) -> PropagationContext {
        PropagationContext {
            range_m,
            frequency_khz: 5.0,
            thermocline_depth_m: 100.0,
            listener_depth_m: 50.0,
            target_depth_m: 50.0,
            surface_duct_enabled: false,
        }
    }

    #[test]
    fn transmission_loss_increases_with_range() {
        let near = transmission_loss_db(&ctx(5_000.0));
        let far = transmission_loss_db(&ctx(50_000.0));
        assert!(far > near);
    }

    #[test]
    fn opposite_sides_of_thermocline_adds_shadow_penalty() {
        let mut same_side = ctx(20_000.0);
        same_side.listener_depth_m = 50.0;
        same_side.target_depth_m = 50.0;
        let mut opposite = same_side;
        opposite.target_depth_m = 150.0;

        assert!(transmission_loss_db(&opposite) > transmission_loss_db(&same_side));
    }

    #[test]
    fn convergence_zone_window_gives_a_bonus_over_nearby_ranges() {
        let mut opposite = ctx(SONAR_CONVERGENCE_ZONE_M);
        opposite.target_depth_m = 150.0;
        let mut off_cz = opposite;
        off_cz.range_m = SONAR_CONVERGENCE_ZONE_M + 2.0 * SONAR_CZ_WINDOW_M;

        assert!(transmission_loss_db(&opposite) < transmission_loss_db(&off_cz));
    }

    #[test]
    fn ambient_noise_increases_with_sea_state() {
        assert!(ambient_noise_db(5) > ambient_noise_db(0));
    }
}
