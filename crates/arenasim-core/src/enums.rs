//! Enumeration types shared across subsystems.

use serde::{Deserialize, Serialize};

/// Side/team tag. Scenarios may introduce additional named sides; the
/// `Neutral`/`Unknown` values cover non-combatant and not-yet-classified
/// entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Blue,
    Red,
    Neutral,
    Unknown,
}

/// Physical entity type tag (the "polymorphic entity" of).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Aircraft,
    Spacecraft,
    SurfaceShip,
    Submarine,
    Radar,
    Jammer,
    Missile,
    Torpedo,
}

/// Physics component discriminant. Exactly one is attached per entity
///("exactly one physics component").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicsKind {
    Orbital2Body,
    Atmospheric3Dof,
    Ship,
    Submarine,
}

/// Link type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    Rf,
    Fiber,
    Laser,
}

/// Link quality bucket, derived from margin dB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkQuality {
    Excellent,
    Good,
    Degraded,
    Lost,
}

impl LinkQuality {
    /// Routing-cost quality factor.
    pub fn cost_factor(&self) -> f64 {
        match self {
            LinkQuality::Excellent => 1.0,
            LinkQuality::Good => 0.8,
            LinkQuality::Degraded => 0.5,
            LinkQuality::Lost => 0.1,
        }
    }
}

/// Network topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Mesh,
    Star,
    Multihop,
    Custom,
}

/// Packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketType {
    Track,
    Targeting,
    Command,
    Custom,
}

/// Reason a packet failed to reach its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    NoRoute,
    TtlExceeded,
    LinkLost,
    Jammed,
    Cyber,
    Bandwidth,
    Expired,
    NodeDead,
}

/// Jammer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JammerType {
    Barrage,
    Spot,
    Sweep,
    Noise,
}

/// Jammer effect direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JamDirection {
    Uplink,
    Downlink,
    Both,
}

/// Cyber attack type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyberAttackType {
    Brick,
    Mitm,
    Inject,
    Ddos,
    Exploit,
}

/// Conjunction alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Watch,
    Warning,
    Critical,
}

/// Radar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadarType {
    Ew,
    Ttr,
    Fcr,
}

/// Radar scan/track state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadarState {
    Scanning,
    Tracking,
}

/// SAM missile flight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamState {
    Flying,
    Terminal,
    Hit,
    Miss,
}

/// F2T2EA engagement phase,
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementPhase {
    Idle,
    Find,
    Fix,
    Track,
    Target,
    Engage,
    Assess,
    Complete,
}

/// Outcome of an ASSESS phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessResult {
    Hit,
    Miss,
}

/// Classification, NATO-style track identification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[default]
    Unknown,
    Pending,
    AssumedFriend,
    Friend,
    Neutral,
    Suspect,
    Hostile,
}
