//! Observable-only effects bus
//! stream the renderer drains. Nothing downstream of `arenasim-sim`
//! ever reads from it within a tick, so the bus owner is free to drop
//! events once it grows past a cap rather than block production on a
//! slow consumer.

use arenasim_core::types::Position;
use arenasim_core::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kinds of visual-only events the physics/combat/flight systems
/// may emit. Data only; no subsystem's correctness depends on these
/// ever being observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Explosion,
    Trail,
    Exhaust,
    Reentry,
}

/// One effect record: `{kind, position, params}`.
/// `params` is a free-form bag (radius, intensity, color hints, the
/// originating entity) since each kind carries different fields and
/// the bus does not interpret them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub position: Position,
    pub source: Option<EntityId>,
    pub tick: u64,
    pub params: Value,
}

/// Default cap on buffered-but-undrained effects. Past this the bus
/// drops the oldest events first, same as a renderer that can't keep
/// up would have to.
pub const EFFECTS_BUS_CAPACITY: usize = 4096;

/// The owned, explicitly-constructed effects bus. One instance lives
/// inside the sim's top-level state; no subsystem may stash a static
/// or global handle to it.
pub struct EffectsBus {
    capacity: usize,
    events: Vec<Effect>,
    dropped_total: u64,
}

impl Default for EffectsBus {
    fn default() -> Self {
        Self::new(EFFECTS_BUS_CAPACITY)
    }
}

impl EffectsBus {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, events: Vec::new(), dropped_total: 0 }
    }

    /// Push an effect, dropping the oldest buffered one if at capacity.
    pub fn push(&mut self, effect: Effect) {
        if self.events.len() >= self.capacity {
            self.events.remove(0);
            self.dropped_total += 1;
        }
        self.events.push(effect);
    }

    pub fn explosion(&mut self, position: Position, source: Option<EntityId>, tick: u64, yield_mt: f64, radius_m: f64) {
        self.push(Effect {
            kind: EffectKind::Explosion,
            position,
            source,
            tick,
            params: serde_json::json!({ "yield_mt": yield_mt, "radius_m": radius_m }),
        });
    }

    pub fn trail(&mut self, position: Position, source: EntityId, tick: u64) {
        self.push(Effect { kind: EffectKind::Trail, position, source: Some(source), tick, params: Value::Null });
    }

    pub fn exhaust(&mut self, position: Position, source: EntityId, tick: u64, throttle: f64) {
        self.push(Effect {
            kind: EffectKind::Exhaust,
            position,
            source: Some(source),
            tick,
            params: serde_json::json!({ "throttle": throttle }),
        });
    }

    pub fn reentry(&mut self, position: Position, source: EntityId, tick: u64, heating_w_m2: f64) {
        self.push(Effect {
            kind: EffectKind::Reentry,
            position,
            source: Some(source),
            tick,
            params: serde_json::json!({ "heating_w_m2": heating_w_m2 }),
        });
    }

    /// Drain every buffered event, for the renderer/observer to consume
    /// once per frame. The stream is unordered; callers must not rely
    /// on emission order.
    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_all_buffered_events_and_empties_the_bus() {
        let mut bus = EffectsBus::new(16);
        bus.trail(Position::new(1.0, 2.0, 3.0), "m-1".to_string(), 10);
        bus.exhaust(Position::new(0.0, 0.0, 0.0), "m-1".to_string(), 10, 0.8);
        assert_eq!(bus.len(), 2);
        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert!(bus.is_empty());
    }

    #[test]
    fn bus_drops_oldest_event_once_over_capacity() {
        let mut bus = EffectsBus::new(2);
        bus.trail(Position::default(), "a".to_string(), 1);
        bus.trail(Position::default(), "b".to_string(), 2);
        bus.trail(Position::default(), "c".to_string(), 3);
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.dropped_total, 1);
        let drained = bus.drain();
        assert_eq!(drained[0].source.as_deref(), Some("b"));
    }

    #[test]
    fn explosion_params_carry_yield_and_radius() {
        let mut bus = EffectsBus::default();
        bus.explosion(Position::new(0.0, 0.0, 0.0), Some("rv-1".to_string()), 42, 0.3, 900.0);
        let events = bus.drain();
        assert_eq!(events[0].params["yield_mt"], 0.3);
        assert_eq!(events[0].params["radius_m"], 900.0);
    }
}
