//! Commands that cross into the simulation from an external caller
//! (a scenario event, an operator console, or the MC bridge). Commands
//! are queued and applied at the next tick boundary, never mid-tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum SimCommand {
    /// Pause the tick loop (scheduler still accepts commands).
    Pause,
    Resume,
    SetTimeScale {
        scale: f64,
    },

    // --- Comms ---
    AddNetwork {
        network_id: String,
        topology: Topology,
        members: Vec<String>,
    },
    RemoveNetwork {
        network_id: String,
    },
    SetJammerActive {
        jammer_id: String,
        active: bool,
    },
    LaunchCyberAttack {
        attacker: String,
        target: String,
        kind: CyberAttackType,
        duration_secs: f64,
    },
    CancelCyberAttack {
        attack_id: String,
    },

    // --- IADS ---
    SetDoctrine {
        weapons_free: bool,
    },
    VetoEngagement {
        engagement_id: u32,
    },

    // --- Maneuver ---
    QueueManeuverNode {
        entity_id: String,
        execute_at: f64,
        prograde_mps: f64,
        normal_mps: f64,
        radial_mps: f64,
    },
}
