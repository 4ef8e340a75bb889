//! Scenario JSON schema. Scenario-file authoring is an
//! external collaborator; this crate only parses
//! the format and exposes it as typed Rust values.

use arenasim_core::enums::{EntityType, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioFile {
    pub metadata: Metadata,
    #[serde(default)]
    pub environment: Environment,
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub events: Vec<ScheduledEvent>,
    #[serde(default)]
    pub camera: Option<CameraSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Environment {
    #[serde(default = "default_time_warp")]
    pub max_time_warp: f64,
    pub weather_preset: Option<String>,
}

fn default_time_warp() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraSpec {
    pub target: String,
    pub range: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntitySpec {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub team: Side,
    #[serde(default)]
    pub initial_state: serde_json::Value,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// One component attachment. Physics variants are mutually exclusive
///; `Ai`, `Weapons`,
/// `Visual`, and `ModelOverride` may repeat or be absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentSpec {
    Orbital2Body {
        sma_m: f64,
        ecc: f64,
        inc_rad: f64,
        raan_rad: f64,
        argp_rad: f64,
        true_anomaly_rad: f64,
    },
    Atmospheric3Dof {
        lat: f64,
        lon: f64,
        alt: f64,
        speed: f64,
        heading: f64,
        #[serde(default)]
        gamma: f64,
        #[serde(default)]
        engine_on: bool,
        #[serde(default)]
        throttle: f64,
    },
    Ship {
        lat: f64,
        lon: f64,
        speed: f64,
        heading: f64,
    },
    Submarine {
        lat: f64,
        lon: f64,
        depth: f64,
        speed: f64,
        heading: f64,
    },
    Ai {
        role: String,
        #[serde(default)]
        ranges: AiRanges,
    },
    Weapons {
        weapon_type: String,
        pk: f64,
        max_range_m: f64,
        cooldown_s: f64,
        inventory: Option<u32>,
        salvo_size: Option<u32>,
    },
    /// Rendering-only hint; carried through unparsed since the renderer
    /// is an external collaborator.
    Visual(serde_json::Value),
    ModelOverride(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AiRanges {
    #[serde(default)]
    pub detect_m: f64,
    #[serde(default)]
    pub engage_m: f64,
}

impl EntitySpec {
    /// The entity's single physics component, if any. A scenario with
    /// zero or more than one physics component among its entries is
    /// malformed.
    pub fn physics_component(&self) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| {
            matches!(
                c,
                ComponentSpec::Orbital2Body { .. }
                    | ComponentSpec::Atmospheric3Dof { .. }
                    | ComponentSpec::Ship { .. }
                    | ComponentSpec::Submarine { .. }
            )
        })
    }

    pub fn physics_component_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    ComponentSpec::Orbital2Body { .. }
                        | ComponentSpec::Atmospheric3Dof { .. }
                        | ComponentSpec::Ship { .. }
                        | ComponentSpec::Submarine { .. }
                )
            })
            .count()
    }

    pub fn ai_component_count(&self) -> usize {
        self.components.iter().filter(|c| matches!(c, ComponentSpec::Ai { .. })).count()
    }
}

/// One scripted event: an action fired at an absolute sim time.
/// `action` and its parameters are free-form(`{time,
/// action, ...}`); the sim dispatches on `action` and interprets the
/// rest of the object itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduledEvent {
    pub time: f64,
    pub action: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}
