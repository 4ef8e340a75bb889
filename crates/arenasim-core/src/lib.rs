//! Core vocabulary shared across every `arenasim-*` crate: entity
//! identifiers, geometric types, component records, commands, events,
//! error types, and tuning constants. Has no dependency on any runtime
//! framework or on `hecs` itself — the entity table lives in
//! `arenasim-sim`.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod types;

/// Opaque entity identifier, stable across a whole simulation run.
/// Scenario files and wire protocols always refer to entities by this
/// string key, never by a direct `hecs::Entity` handle
/// ("storing IDs only, never direct pointers").
pub type EntityId = String;

#[cfg(test)]
mod tests {
    use super::types::*;

    #[test]
    fn sim_time_advances_monotonically() {
        let mut t = SimTime::default();
        for _ in 0..10 {
            t.advance(0.01);
        }
        assert_eq!(t.tick, 10);
        assert!((t.elapsed_secs - 0.1).abs() < 1e-9);
    }

    #[test]
    fn position_range_and_bearing() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(0.0, 1000.0, 0.0);
        assert!((a.range_to(&b) - 1000.0).abs() < 1e-9);
        assert!(a.bearing_to(&b).abs() < 1e-9); // due north = 0 rad
    }
}
