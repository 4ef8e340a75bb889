//! SDA maneuver-detection variant: flags a sudden delta-v or SMA change
//! between ticks as an attributable maneuver.

use arenasim_core::constants::{SDA_DSMA_THRESHOLD_M, SDA_DV_THRESHOLD_MPS};
use arenasim_core::enums::Side;
use arenasim_core::EntityId;

#[derive(Debug, Clone)]
pub struct ManeuverAlert {
    pub entity: EntityId,
    pub team: Side,
    pub delta_v_mps: f64,
    pub delta_sma_m: f64,
}

/// One entity's tracked kinematic history for maneuver-change detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackedState {
    pub speed_mps: f64,
    pub sma_m: f64,
}

/// Compare this tick's state against the last tick's and emit a
/// maneuver alert if either threshold is exceeded.
pub fn detect_maneuver(entity: &EntityId, team: Side, prev: &TrackedState, now: &TrackedState) -> Option<ManeuverAlert> {
    let delta_v = (now.speed_mps - prev.speed_mps).abs();
    let delta_sma = (now.sma_m - prev.sma_m).abs();
    if delta_v > SDA_DV_THRESHOLD_MPS || delta_sma > SDA_DSMA_THRESHOLD_M {
        Some(ManeuverAlert { entity: entity.clone(), team, delta_v_mps: delta_v, delta_sma_m: delta_sma })
    } else {
        None
    }
}
