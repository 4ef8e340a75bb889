//! F2T2EA engagement state machine. Transitions are one-way forward
//! except ASSESS -> TARGET on a miss with magazine remaining.

use arenasim_core::enums::{AssessResult, EngagementPhase};
use arenasim_core::EntityId;

#[derive(Debug, Clone, Copy)]
pub struct EngagementConfig {
    pub track_confidence_threshold: f64,
    pub confidence_gain_per_update: f64,
    pub salvo_size: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self { track_confidence_threshold: 1.0, confidence_gain_per_update: 0.2, salvo_size: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct Engagement {
    pub phase: EngagementPhase,
    pub target: Option<EntityId>,
    pub track_confidence: f64,
    pub magazine_remaining: u32,
}

impl Engagement {
    pub fn new(magazine: u32) -> Self {
        Self {
            phase: EngagementPhase::Idle,
            target: None,
            track_confidence: 0.0,
            magazine_remaining: magazine,
        }
    }

    /// EW detects a target: IDLE -> FIND.
    pub fn on_ew_detect(&mut self, target: EntityId) {
        if self.phase == EngagementPhase::Idle {
            self.target = Some(target);
            self.phase = EngagementPhase::Find;
        }
    }

    /// EW hands the track off to a TTR by frequency and bearing: FIND -> FIX.
    pub fn on_ttr_handoff(&mut self) {
        if self.phase == EngagementPhase::Find {
            self.phase = EngagementPhase::Fix;
        }
    }

    /// One TTR update arrives. FIX -> TRACK on the first update; further
    /// updates raise `track_confidence` until it crosses the threshold,
    /// which promotes TRACK -> TARGET (FCR assignment is implied at that
    /// transition).
    pub fn on_ttr_update(&mut self, cfg: &EngagementConfig) {
        match self.phase {
            EngagementPhase::Fix => {
                self.phase = EngagementPhase::Track;
                self.track_confidence = cfg.confidence_gain_per_update;
            }
            EngagementPhase::Track => {
                self.track_confidence += cfg.confidence_gain_per_update;
                if self.track_confidence >= cfg.track_confidence_threshold {
                    self.phase = EngagementPhase::Target;
                }
            }
            _ => {}
        }
    }

    /// Launch a salvo: TARGET -> ENGAGE. No-op if the magazine is empty.
    pub fn on_engage(&mut self, cfg: &EngagementConfig) -> bool {
        if self.phase != EngagementPhase::Target || self.magazine_remaining == 0 {
            return false;
        }
        let spent = cfg.salvo_size.min(self.magazine_remaining);
        self.magazine_remaining -= spent;
        self.phase = EngagementPhase::Engage;
        true
    }

    /// Flight-out resolves: ENGAGE -> ASSESS.
    pub fn on_flight_resolved(&mut self) {
        if self.phase == EngagementPhase::Engage {
            self.phase = EngagementPhase::Assess;
        }
    }

    /// Inspect the intercept outcome. A hit completes the engagement; a
    /// miss retries from TARGET if the magazine has rounds left,
    /// otherwise also completes.
    pub fn on_assess(&mut self, result: AssessResult) {
        if self.phase != EngagementPhase::Assess {
            return;
        }
        match result {
            AssessResult::Hit => self.phase = EngagementPhase::Complete,
            AssessResult::Miss => {
                if self.magazine_remaining > 0 {
                    self.phase = EngagementPhase::Target;
                } else {
                    self.phase = EngagementPhase::Complete;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_engagement(magazine: u32) -> Engagement {
        Engagement::new(magazine)
    }

    #[test]
    fn happy_path_reaches_complete_on_hit() {
        let cfg = EngagementConfig::default();
        let mut e = full_engagement(2);
        e.on_ew_detect("tgt-1".to_string());
        assert_eq!(e.phase, EngagementPhase::Find);
        e.on_ttr_handoff();
        assert_eq!(e.phase, EngagementPhase::Fix);
        e.on_ttr_update(&cfg);
        assert_eq!(e.phase, EngagementPhase::Track);
        e.on_ttr_update(&cfg);
        e.on_ttr_update(&cfg);
        e.on_ttr_update(&cfg);
        e.on_ttr_update(&cfg);
        assert_eq!(e.phase, EngagementPhase::Target);
        assert!(e.on_engage(&cfg));
        assert_eq!(e.phase, EngagementPhase::Engage);
        e.on_flight_resolved();
        assert_eq!(e.phase, EngagementPhase::Assess);
        e.on_assess(AssessResult::Hit);
        assert_eq!(e.phase, EngagementPhase::Complete);
    }

    #[test]
    fn miss_retries_to_target_when_magazine_remains() {
        let cfg = EngagementConfig::default();
        let mut e = full_engagement(2);
        e.phase = EngagementPhase::Assess;
        e.on_assess(AssessResult::Miss);
        assert_eq!(e.phase, EngagementPhase::Target);
        assert!(e.on_engage(&cfg));
        e.on_flight_resolved();
        e.on_assess(AssessResult::Miss);
        assert_eq!(e.phase, EngagementPhase::Complete);
    }

    #[test]
    fn engage_fails_with_empty_magazine() {
        let cfg = EngagementConfig::default();
        let mut e = full_engagement(0);
        e.phase = EngagementPhase::Target;
        assert!(!e.on_engage(&cfg));
        assert_eq!(e.phase, EngagementPhase::Target);
    }
}
