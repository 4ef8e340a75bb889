//! Per-tick physics dispatch: advances every entity's own propagator
//! (orbital, atmospheric, or naval) and freezes the results into a
//! snapshot that every downstream system reads for the rest of the
//! tick.

use std::collections::HashMap;

use arenasim_core::components::{FlightRecord, NavalRecord, OrbitalState};
use arenasim_core::constants::MU_EARTH;
use arenasim_core::types::{Position, Velocity};
use arenasim_core::EntityId;
use arenasim_flight::{AircraftPerformance, FlightControls};
use arenasim_orbital::kepler;
use arenasim_weather::WeatherModel;

use crate::world::EntityRegistry;

/// One entity's frozen position/velocity for this tick, in ECI meters
/// (naval/ground entities are approximated as stationary in ECI over
/// one tick and carry a separate geodetic position for range math).
#[derive(Debug, Clone, Copy)]
pub struct EntitySnapshot {
    pub eci_pos: Position,
    pub eci_vel: Velocity,
    pub alive: bool,
}

pub type SnapshotMap = HashMap<EntityId, EntitySnapshot>;

/// Advance every physics component by `dt` and return the frozen
/// snapshot for this tick.
pub fn run(
    world: &mut hecs::World,
    registry: &EntityRegistry,
    weather: &WeatherModel,
    sim_time_secs: f64,
    dt: f64,
) -> SnapshotMap {
    step_orbital(world, dt);
    step_flight(world, weather, sim_time_secs, dt);
    crate::naval::step_naval(world, dt);

    build_snapshot(world, registry, sim_time_secs + dt)
}

fn step_orbital(world: &mut hecs::World, dt: f64) {
    for (_, state) in world.query_mut::<&mut OrbitalState>() {
        let result = kepler::propagate(&state.eci_pos, &state.eci_vel, dt, MU_EARTH);
        if result.valid {
            state.eci_pos = result.position;
            state.eci_vel = result.velocity;
        }
    }
}

fn step_flight(world: &mut hecs::World, weather: &WeatherModel, sim_time_secs: f64, dt: f64) {
    let perf = AircraftPerformance::default();
    for (_, flight) in world.query_mut::<&mut FlightRecord>() {
        // No onboard AI/autopilot wiring yet: entities hold their last
        // commanded throttle/bank and fly straight and level. Scripted
        // events and future AI systems drive `FlightControls` by
        // mutating these fields directly before physics runs.
        let controls = FlightControls {
            throttle: flight.throttle,
            roll_rad: flight.roll,
            load_factor: 1.0,
            engine_on: flight.engine_on,
        };
        arenasim_flight::step(flight, &controls, &perf, weather, sim_time_secs, dt);
    }
}

fn build_snapshot(world: &hecs::World, registry: &EntityRegistry, sim_time_secs: f64) -> SnapshotMap {
    let mut out = SnapshotMap::new();
    for id in registry.ids() {
        let Some(entity) = registry.get(id) else { continue };
        let alive = world
            .get::<&arenasim_core::components::Active>(entity)
            .map(|a| a.0)
            .unwrap_or(true);

        let snapshot = if let Ok(orbital) = world.get::<&OrbitalState>(entity) {
            EntitySnapshot { eci_pos: orbital.eci_pos, eci_vel: orbital.eci_vel, alive }
        } else if let Ok(flight) = world.get::<&FlightRecord>(entity) {
            EntitySnapshot { eci_pos: flight.eci_pos, eci_vel: flight.eci_vel, alive }
        } else if let Ok(naval) = world.get::<&NavalRecord>(entity) {
            let pos = arenasim_orbital::frames::geodetic_to_eci(naval.lat, naval.lon, -naval.depth, sim_time_secs);
            EntitySnapshot { eci_pos: pos, eci_vel: Velocity::default(), alive }
        } else {
            continue;
        };
        out.insert(id.clone(), snapshot);
    }
    out
}
