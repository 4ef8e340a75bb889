//! Cyber attacks: progress-gated effects applied to a target node's
//! comm/cyber records, reversible via cancellation.

use arenasim_core::components::{CommRecord, CyberRecord};
use arenasim_core::enums::CyberAttackType;
use arenasim_core::EntityId;

#[derive(Debug, Clone)]
pub struct CyberAttack {
    pub id: String,
    pub attack_type: CyberAttackType,
    pub target: EntityId,
    pub duration_s: f64,
    pub progress: f64,
    pub applied: bool,
    pub cancelled: bool,
}

impl CyberAttack {
    pub fn new(id: String, attack_type: CyberAttackType, target: EntityId, duration_s: f64) -> Self {
        Self { id, attack_type, target, duration_s, progress: 0.0, applied: false, cancelled: false }
    }

    pub fn is_complete(&self) -> bool {
        self.applied || self.cancelled
    }
}

/// Advance one attack's progress; when it crosses 1.0 the effect is
/// applied exactly once.
pub fn step(attack: &mut CyberAttack, dt: f64, comm: &mut CommRecord, cyber: &mut CyberRecord) {
    if attack.cancelled || attack.applied {
        return;
    }
    attack.progress += dt / attack.duration_s.max(1e-6);
    if attack.progress >= 1.0 {
        apply_effect(attack.attack_type, comm, cyber);
        attack.applied = true;
    }
}

fn apply_effect(attack_type: CyberAttackType, comm: &mut CommRecord, cyber: &mut CyberRecord) {
    match attack_type {
        CyberAttackType::Brick => {
            comm.bricked = true;
        }
        CyberAttackType::Mitm => {
            cyber.mitm_intercepted = true;
        }
        CyberAttackType::Inject => {
            // Track-packet injection is realized by the caller (the
            // comms engine spawns a false track packet); this flag just
            // records that the node is a live injection source.
            comm.compromised = true;
        }
        CyberAttackType::Ddos => {
            cyber.ddos_multiplier = 0.05;
        }
        CyberAttackType::Exploit => {
            comm.compromised = true;
        }
    }
}

fn reverse_effect(attack_type: CyberAttackType, comm: &mut CommRecord, cyber: &mut CyberRecord) {
    match attack_type {
        CyberAttackType::Brick => comm.bricked = false,
        CyberAttackType::Mitm => cyber.mitm_intercepted = false,
        CyberAttackType::Inject => comm.compromised = false,
        CyberAttackType::Ddos => cyber.ddos_multiplier = 1.0,
        CyberAttackType::Exploit => comm.compromised = false,
    }
}

/// Cancel a running or completed attack, reversing any applied effect.
pub fn cancel(attack: &mut CyberAttack, comm: &mut CommRecord, cyber: &mut CyberRecord) {
    if attack.applied {
        reverse_effect(attack.attack_type, comm, cyber);
    }
    attack.cancelled = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddos_multiplies_throughput_down_on_completion() {
        let mut attack = CyberAttack::new("a1".to_string(), CyberAttackType::Ddos, "n1".to_string(), 10.0);
        let mut comm = CommRecord::default();
        let mut cyber = CyberRecord { ddos_multiplier: 1.0, ..Default::default() };
        for _ in 0..20 {
            step(&mut attack, 1.0, &mut comm, &mut cyber);
        }
        assert_eq!(cyber.ddos_multiplier, 0.05);
        assert!(attack.applied);
    }

    #[test]
    fn cancel_reverses_applied_effect() {
        let mut attack = CyberAttack::new("a1".to_string(), CyberAttackType::Brick, "n1".to_string(), 1.0);
        let mut comm = CommRecord::default();
        let mut cyber = CyberRecord::default();
        step(&mut attack, 2.0, &mut comm, &mut cyber);
        assert!(comm.bricked);
        cancel(&mut attack, &mut comm, &mut cyber);
        assert!(!comm.bricked);
    }

    #[test]
    fn cancel_before_completion_just_stops_progress() {
        let mut attack = CyberAttack::new("a1".to_string(), CyberAttackType::Exploit, "n1".to_string(), 10.0);
        let mut comm = CommRecord::default();
        let mut cyber = CyberRecord::default();
        step(&mut attack, 1.0, &mut comm, &mut cyber);
        cancel(&mut attack, &mut comm, &mut cyber);
        assert!(!comm.compromised);
        step(&mut attack, 100.0, &mut comm, &mut cyber);
        assert!(!comm.compromised, "cancelled attacks must not resume");
    }
}
