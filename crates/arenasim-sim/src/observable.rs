//! The read-only aggregated view handed to the rendering client / MC
//! bridge each tick. Nothing downstream may mutate through this; it is
//! a plain snapshot, not a handle into the world.

use arenasim_core::enums::{Classification, EntityType, Side};
use arenasim_core::types::Position;
use arenasim_core::EntityId;
use arenasim_conjunction::{ConjunctionAlert, ManeuverAlert};
use arenasim_effects::Effect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityObservable {
    pub id: EntityId,
    pub name: String,
    pub team: Side,
    pub entity_type: EntityType,
    pub position: Position,
    pub speed_mps: f64,
    pub track_number: Option<u32>,
    pub classification: Classification,
    pub alive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommsSummary {
    pub delivery_rate: f64,
    pub average_latency_s: f64,
    pub throughput_bps: f64,
    pub in_flight: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservableState {
    pub tick: u64,
    pub elapsed_secs: f64,
    pub entities: Vec<EntityObservable>,
    pub conjunction_alerts: Vec<ConjunctionAlertView>,
    pub maneuver_alerts: Vec<ManeuverAlertView>,
    pub comms: CommsSummary,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConjunctionAlertView {
    pub a: EntityId,
    pub b: EntityId,
    pub name_a: String,
    pub name_b: String,
    pub distance_m: f64,
    pub tca_s: Option<f64>,
    pub severity: arenasim_core::enums::AlertSeverity,
    pub eci_midpoint: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManeuverAlertView {
    pub entity: EntityId,
    pub delta_v_mps: f64,
    pub delta_sma_m: f64,
}

impl From<&ConjunctionAlert> for ConjunctionAlertView {
    fn from(a: &ConjunctionAlert) -> Self {
        Self {
            a: a.a.clone(),
            b: a.b.clone(),
            name_a: a.name_a.clone(),
            name_b: a.name_b.clone(),
            distance_m: a.distance_m,
            tca_s: a.tca_s,
            severity: a.severity,
            eci_midpoint: a.eci_midpoint,
        }
    }
}

impl From<&ManeuverAlert> for ManeuverAlertView {
    fn from(a: &ManeuverAlert) -> Self {
        Self { entity: a.entity.clone(), delta_v_mps: a.delta_v_mps, delta_sma_m: a.delta_sma_m }
    }
}
