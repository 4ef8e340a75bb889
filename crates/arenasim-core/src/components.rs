//! ECS components for hecs entities.
//!
//! Components are plain data structs; subsystem logic lives in systems,
//! not here.("duck-typed state map"), the old pattern of
//! scattering `state._foo` fields across a shared blob is replaced by one
//! explicit record per domain (`FlightRecord`, `CommRecord`, `SensorRecord`,
//! `CyberRecord`), each mutated by exactly one subsystem.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;
use crate::EntityId;

/// Carries the scenario-facing string ID on every spawned entity, so any
/// system holding only a `hecs::Entity` handle can recover the key that
/// crosses crate boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdTag(pub EntityId);

/// Marks an entity's side/team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTag(pub Side);

/// Marks an entity's physical type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypeTag(pub EntityType);

/// Human-readable scenario name, kept separate from the entity ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayName(pub String);

/// Radar cross section in square meters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RadarCrossSection {
    pub base_rcs_m2: f64,
}

/// Orbital two-body physics state: ECI position/velocity are cached here
/// between ticks so sensors, comms, and the renderer can read a stable
/// snapshot without re-deriving it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OrbitalState {
    pub eci_pos: Position,
    pub eci_vel: crate::types::Velocity,
}

/// 3-DOF atmospheric flight state, local ENU frame. Mirrors the aircraft
/// state vector of
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlightRecord {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub speed: f64,
    pub heading: f64,
    pub gamma: f64,
    pub roll: f64,
    pub throttle: f64,
    pub engine_on: bool,
    /// 0..1, mixes aerodynamic acceleration against vacuum two-body gravity.
    pub aero_blend: f64,
    /// ECI cache, authoritative for orbital computations when `aero_blend < 0.1`.
    pub eci_pos: Position,
    pub eci_vel: crate::types::Velocity,
}

impl Default for FlightRecord {
    fn default() -> Self {
        Self {
            lat: 0.0,
            lon: 0.0,
            alt: 0.0,
            speed: 0.0,
            heading: 0.0,
            gamma: 0.0,
            roll: 0.0,
            throttle: 0.0,
            engine_on: false,
            aero_blend: 1.0,
            eci_pos: Position::default(),
            eci_vel: crate::types::Velocity::default(),
        }
    }
}

/// Ship/submarine surface or subsurface kinematic state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NavalRecord {
    pub lat: f64,
    pub lon: f64,
    pub depth: f64,
    pub speed: f64,
    pub heading: f64,
    pub is_submerged: bool,
    /// Sea state 0-9, used by the sonar ambient-noise model.
    pub sea_state: u8,
}

/// Per-entity communications state, owned exclusively by the comms engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommRecord {
    pub network_ids: Vec<String>,
    pub is_command_node: bool,
    pub has_weapons: bool,
    pub bricked: bool,
    pub compromised: bool,
}

/// Per-entity sensor/track state, owned exclusively by the detection system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorRecord {
    pub track_number: Option<u32>,
    pub quality: f64,
    pub classification: Classification,
    pub hits: u32,
    pub misses: u32,
}

/// Per-entity cyber-effect state, owned exclusively by the cyber subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyberRecord {
    pub mitm_intercepted: bool,
    pub ddos_multiplier: f64,
}

impl Default for CyberRecord {
    fn default() -> Self {
        Self { mitm_intercepted: false, ddos_multiplier: 1.0 }
    }
}

/// History of positions for trail rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionHistory {
    pub positions: Vec<Position>,
}

/// Whether an entity still participates in the simulation. Destroyed
/// entities (missile impact, kill assessment) are marked dead rather
/// than despawned outright, so the tick's frozen snapshot and any
/// in-flight packet/engagement referencing them can still resolve
/// cleanly this tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Active(pub bool);

impl Default for Active {
    fn default() -> Self {
        Self(true)
    }
}

/// AI doctrine role and engagement ranges, carried from the scenario's
/// `Ai` component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiComponent {
    pub role: String,
    pub detect_m: f64,
    pub engage_m: f64,
}

/// Weapon loadout, carried from the scenario's `Weapons` component.
/// `cooldown_remaining_s` is mutated exclusively by the combat system;
/// every other field is fixed at spawn time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponComponent {
    pub weapon_type: String,
    pub pk: f64,
    pub max_range_m: f64,
    pub cooldown_s: f64,
    pub inventory: Option<u32>,
    pub salvo_size: u32,
    pub cooldown_remaining_s: f64,
}

/// Invariant checks an entity's state blob must satisfy.
/// Returns the first violated invariant, if any.
pub fn check_flight_invariants(f: &FlightRecord) -> Option<&'static str> {
    if f.alt < -500.0 {
        return Some("alt below -500m floor");
    }
    if f.lat.abs() >= std::f64::consts::FRAC_PI_2 - 1e-6 {
        return Some("lat at or beyond a pole");
    }
    if !(0.0..std::f64::consts::TAU).contains(&f.heading) {
        return Some("heading outside [0, tau)");
    }
    None
}
