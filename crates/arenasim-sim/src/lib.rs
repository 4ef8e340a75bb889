//! Tick scheduler: the `Simulation` that owns the hecs world, every
//! subsystem engine, and the multi-rate accumulators that sequence them
//! into one `tick(dt)` call. This is the re-architected replacement for
//! the source's module-level mutable singletons (`CommEngine`,
//! `ConjunctionSystem`, `SpaceplanePlanner`, `TacticalDatalink`): each
//! subsystem here is constructed once, owned by `Simulation`, and
//! destroyed with it.
//!
//! Per-tick ordering (never violated): physics, weather, sensors,
//! datalink, comms (link budget / cyber / self-heal, then routing +
//! packet advance), combat, effects, conjunction/SDA, metrics, publish.
//! Every sub-system after physics reads the frozen position snapshot
//! taken at step 1; none observes another's in-progress writes.

pub mod combat;
pub mod comms_glue;
pub mod maneuver_exec;
pub mod naval;
pub mod observable;
pub mod physics;
pub mod sensors;
pub mod spawn;
pub mod world;

use std::collections::HashMap;

use arenasim_comms::{CommEngine, CommEngineConfig, LinkConfig};
use arenasim_conjunction::{ConjunctionConfig, ConjunctionEngine, ConjunctionEntity};
use arenasim_core::commands::SimCommand;
use arenasim_core::components::{Active, CommRecord, CyberRecord, DisplayName, OrbitalState, TeamTag, TypeTag, WeaponComponent};
use arenasim_core::constants::{
    AUTO_TRACK_PACKET_INTERVAL_SECS, COMMS_LINK_RATE_HZ, COMMS_ROUTING_RATE_HZ, CONJUNCTION_RATE_HZ,
    DATALINK_RATE_HZ, MAX_DT, MU_EARTH,
};
use arenasim_core::enums::Classification;
use arenasim_core::error::SimResult;
use arenasim_core::types::{Position, SimTime};
use arenasim_core::EntityId;
use arenasim_effects::EffectsBus;
use arenasim_iads::radar::RadarUnit;
use arenasim_scenario::{EventScheduler, ScenarioFile};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use combat::EngagementSite;
use maneuver_exec::ManeuverNode;
use observable::ObservableState;
use world::EntityRegistry;

/// An accumulator-driven sub-system rate: runs when `acc >= interval`,
/// decrementing by `interval` (not resetting to zero) so a sub-system
/// that runs behind doesn't silently lose ticks, while still clamping
/// against spiral-of-death when real time lags badly.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    value: f64,
}

impl Accumulator {
    fn accumulate_and_drain(&mut self, dt: f64, interval_s: f64) -> u32 {
        self.value += dt;
        let mut fired = 0;
        while self.value >= interval_s && fired < 8 {
            self.value -= interval_s;
            fired += 1;
        }
        // Spiral-of-death guard: never let backlog exceed one interval.
        if self.value > interval_s {
            self.value = self.value % interval_s;
        }
        fired
    }
}

pub struct SimulationConfig {
    pub comm_engine: CommEngineConfig,
    pub conjunction: ConjunctionConfig,
    pub weapons_free: bool,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            comm_engine: CommEngineConfig::default(),
            conjunction: ConjunctionConfig::default(),
            weapons_free: false,
            seed: 0,
        }
    }
}

/// The whole simulation: one per scenario run, owning every subsystem.
/// Nothing here is a `static`/process-wide singleton; a `Simulation`
/// instance is safe to construct (and drop) many times in the same
/// process, which the Monte-Carlo bridge's per-replication isolation
/// depends on.
pub struct Simulation {
    world: hecs::World,
    registry: EntityRegistry,
    weather: arenasim_weather::WeatherModel,
    comm_engine: CommEngine,
    conjunction: ConjunctionEngine,
    effects: EffectsBus,
    radars: HashMap<EntityId, RadarUnit>,
    sites: HashMap<EntityId, EngagementSite>,
    scheduler: EventScheduler,
    maneuver_queue: Vec<ManeuverNode>,
    cyber_attack_targets: HashMap<String, EntityId>,
    command_queue: Vec<SimCommand>,
    rng: ChaCha8Rng,
    weapons_free: bool,
    paused: bool,
    time_scale: f64,
    sim_time: SimTime,

    sensor_acc: Accumulator,
    datalink_acc: Accumulator,
    comms_link_acc: Accumulator,
    comms_route_acc: Accumulator,
    auto_track_acc: Accumulator,
    conjunction_acc: Accumulator,
}

impl Simulation {
    pub fn new(scenario: &ScenarioFile, config: SimulationConfig) -> Self {
        let mut world = hecs::World::new();
        let mut registry = EntityRegistry::default();
        spawn::spawn_scenario(&mut world, &mut registry, scenario);
        let radars = sensors::build_radar_units(&world, &registry);
        let sites = combat::build_sites(&world, &registry);

        Self {
            world,
            registry,
            weather: arenasim_weather::WeatherModel::default(),
            comm_engine: CommEngine::new(config.comm_engine),
            conjunction: ConjunctionEngine::new(config.conjunction),
            effects: EffectsBus::default(),
            radars,
            sites,
            scheduler: EventScheduler::new(scenario.events.clone()),
            maneuver_queue: Vec::new(),
            cyber_attack_targets: HashMap::new(),
            command_queue: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            weapons_free: config.weapons_free,
            paused: false,
            time_scale: scenario.environment.max_time_warp.max(0.0),
            sim_time: SimTime::default(),
        }
    }

    pub fn load(json: &str, config: SimulationConfig) -> SimResult<Self> {
        let scenario = arenasim_scenario::load(json)?;
        Ok(Self::new(&scenario, config))
    }

    pub fn sim_time(&self) -> SimTime {
        self.sim_time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Queue a command for application at the next tick boundary. Never
    /// applied mid-tick, per `SimCommand`'s doc comment.
    pub fn enqueue_command(&mut self, command: SimCommand) {
        self.command_queue.push(command);
    }

    /// Advance the simulation by `dt` seconds, clamped to `MAX_DT` to
    /// prevent integrator blow-up after a pause or a slow host frame.
    /// Returns the observable state published at the end of the tick.
    pub fn tick(&mut self, dt: f64) -> ObservableState {
        let dt = dt.min(MAX_DT).max(0.0);

        self.apply_due_scenario_events();
        self.apply_queued_commands();

        if self.paused {
            return self.publish();
        }

        // Step 1: physics. Every later step reads this tick's frozen
        // snapshot; nothing downstream mutates positions.
        let snapshot = physics::run(&mut self.world, &self.registry, &self.weather, self.sim_time.elapsed_secs, dt);
        self.apply_due_maneuvers();

        // Step 2: weather has no per-entity state to step in this
        // implementation (wind/clouds/turbulence are queried, not
        // stepped); terrain cache is static. Nothing to do per tick.

        // Step 3: sensors.
        let radar_detections = sensors::step_radar(&mut self.world, &self.registry, &mut self.radars, &snapshot, self.sim_time.elapsed_secs, dt);
        sensors::step_sonar(&mut self.world, &self.registry);

        // Step 4: tactical datalink, 1 Hz — folded into the auto
        // track-packet cadence below since both are "detection -> track
        // packet" on a timer; see `enqueue_track_packets`.
        let datalink_fires = self.datalink_acc.accumulate_and_drain(dt, 1.0 / DATALINK_RATE_HZ) > 0;

        // Step 5: comms link states / jammers / cyber / self-heal, 4 Hz.
        let comms_frame = comms_glue::gather_frame(&self.world, &self.registry, &snapshot);
        let link_fires = self.comms_link_acc.accumulate_and_drain(dt, 1.0 / COMMS_LINK_RATE_HZ);
        for _ in 0..link_fires {
            comms_glue::step_cyber_and_links(&mut self.world, &self.registry, &mut self.comm_engine, &comms_frame, 1.0 / COMMS_LINK_RATE_HZ);
            comms_glue::self_heal(&self.world, &self.registry, &mut self.comm_engine, &comms_frame);
        }

        // Step 6: routing + packet advance, 2 Hz.
        let route_fires = self.comms_route_acc.accumulate_and_drain(dt, 1.0 / COMMS_ROUTING_RATE_HZ);
        for _ in 0..route_fires {
            comms_glue::advance_and_distribute(
                &self.world,
                &self.registry,
                &mut self.comm_engine,
                &comms_frame,
                self.sim_time.elapsed_secs,
                1.0 / COMMS_ROUTING_RATE_HZ,
                &mut self.rng,
            );
        }

        // Step 7: auto track-packet generation, every 2s sim (and
        // whenever the 1 Hz datalink cadence also fires this tick).
        let auto_track_fires = self.auto_track_acc.accumulate_and_drain(dt, AUTO_TRACK_PACKET_INTERVAL_SECS) > 0;
        if auto_track_fires || datalink_fires {
            comms_glue::enqueue_track_packets(&self.world, &self.registry, &mut self.comm_engine, &radar_detections, self.sim_time.elapsed_secs);
        }

        // Step 8: combat engagements, every tick.
        combat::step(
            &mut self.world,
            &self.registry,
            &mut self.sites,
            &radar_detections,
            &snapshot,
            &mut self.effects,
            self.sim_time.tick,
            dt,
            self.weapons_free,
        );

        // Step 9: effects bus has no time-based decay in this model;
        // events are pushed by the producing system and drained on
        // publish/query.

        // Step 10: conjunction / SDA, throttled to `CONJUNCTION_RATE_HZ`.
        let conjunction_fires = self.conjunction_acc.accumulate_and_drain(dt, 1.0 / CONJUNCTION_RATE_HZ);
        if conjunction_fires > 0 {
            let entities = self.conjunction_entities(&snapshot);
            self.conjunction.step(&entities, 1.0 / CONJUNCTION_RATE_HZ);
        }

        // Step 11/12: metrics and publish.
        self.sim_time.advance(dt);
        self.publish()
    }

    fn conjunction_entities(&self, snapshot: &physics::SnapshotMap) -> Vec<ConjunctionEntity> {
        let mut out = Vec::new();
        for id in self.registry.ids() {
            let Some(entity) = self.registry.get(id) else { continue };
            let Some(snap) = snapshot.get(id) else { continue };
            if !snap.alive {
                continue;
            }
            let Ok(team) = self.world.get::<&TeamTag>(entity) else { continue };
            let name = self.world.get::<&DisplayName>(entity).map(|d| d.0.clone()).unwrap_or_else(|_| id.clone());
            let sma_m = self
                .world
                .get::<&OrbitalState>(entity)
                .ok()
                .map(|o| arenasim_orbital::from_state(&o.eci_pos, &o.eci_vel, MU_EARTH, arenasim_core::constants::EARTH_RADIUS_M))
                .filter(|e| !e.degenerate)
                .map(|e| e.semi_major_axis_m);
            out.push(ConjunctionEntity {
                id: id.clone(),
                name,
                team: team.0.clone(),
                position: snap.eci_pos,
                velocity: Some(snap.eci_vel),
                sma_m,
            });
        }
        out
    }

    fn apply_due_maneuvers(&mut self) {
        let now = self.sim_time.elapsed_secs;
        let (due, pending): (Vec<_>, Vec<_>) = self.maneuver_queue.drain(..).partition(|n| n.execute_at_s <= now);
        self.maneuver_queue = pending;
        for node in due {
            let Some(entity) = self.registry.get(&node.entity) else { continue };
            let Ok(mut orbital) = self.world.get::<&mut OrbitalState>(entity) else {
                tracing::warn!(entity = %node.entity, "maneuver node queued for a non-orbital entity, dropping");
                continue;
            };
            let dv = maneuver_exec::to_inertial_delta_v(&orbital.eci_pos, &orbital.eci_vel, node.prograde_mps, node.normal_mps, node.radial_mps);
            orbital.eci_vel.x += dv.x;
            orbital.eci_vel.y += dv.y;
            orbital.eci_vel.z += dv.z;
            tracing::debug!(entity = %node.entity, dv_mps = dv.speed(), "maneuver node applied");
        }
    }

    fn apply_due_scenario_events(&mut self) {
        let due = self.scheduler.due(self.sim_time.elapsed_secs);
        for event in due {
            match event_to_command(&event) {
                Ok(command) => self.command_queue.push(command),
                Err(e) => tracing::warn!(action = %event.action, error = %e, "scenario event did not map to a known command"),
            }
        }
    }

    fn apply_queued_commands(&mut self) {
        let commands = std::mem::take(&mut self.command_queue);
        for command in commands {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::Pause => self.paused = true,
            SimCommand::Resume => self.paused = false,
            SimCommand::SetTimeScale { scale } => self.time_scale = scale.max(0.0),
            SimCommand::AddNetwork { network_id, topology, members } => {
                let hub = if topology == arenasim_core::enums::Topology::Star { members.first().cloned() } else { None };
                let spec = arenasim_comms::graph::NetworkSpec { id: network_id.clone(), topology, node_ids: members.clone(), hub, custom_edges: Vec::new() };
                self.comm_engine.add_network(spec, network_id.clone(), arenasim_core::enums::LinkType::Rf, LinkConfig::Rf(arenasim_comms::default_rf_params()));
                for member in &members {
                    if let Some(entity) = self.registry.get(member) {
                        if let Ok(mut comm) = self.world.get::<&mut CommRecord>(entity) {
                            if !comm.network_ids.contains(&network_id) {
                                comm.network_ids.push(network_id.clone());
                            }
                        }
                    }
                }
            }
            SimCommand::RemoveNetwork { network_id } => {
                self.comm_engine.remove_network(&network_id);
                for id in self.registry.ids().cloned().collect::<Vec<_>>() {
                    if let Some(entity) = self.registry.get(&id) {
                        if let Ok(mut comm) = self.world.get::<&mut CommRecord>(entity) {
                            comm.network_ids.retain(|n| n != &network_id);
                        }
                    }
                }
            }
            SimCommand::SetJammerActive { jammer_id, active } => self.comm_engine.set_jammer_active(&jammer_id, active),
            SimCommand::LaunchCyberAttack { attacker: _, target, kind, duration_secs } => {
                let attack_id = format!("cyber-{}-{}", target, self.sim_time.tick);
                self.cyber_attack_targets.insert(attack_id.clone(), target.clone());
                self.comm_engine.launch_cyber_attack(arenasim_comms::cyber::CyberAttack::new(attack_id, kind, target, duration_secs));
            }
            SimCommand::CancelCyberAttack { attack_id } => {
                let Some(target) = self.comm_engine.cyber_attack_target(&attack_id).or_else(|| self.cyber_attack_targets.get(&attack_id).cloned()) else { return };
                let Some(entity) = self.registry.get(&target) else { return };
                let (mut comm, mut cyber_rec) = match (self.world.get::<&mut CommRecord>(entity), self.world.get::<&mut CyberRecord>(entity)) {
                    (Ok(c), Ok(k)) => (c, k),
                    _ => return,
                };
                self.comm_engine.cancel_cyber_attack(&attack_id, &mut comm, &mut cyber_rec);
            }
            SimCommand::SetDoctrine { weapons_free } => self.weapons_free = weapons_free,
            SimCommand::VetoEngagement { engagement_id: _ } => {
                // No numeric engagement-id index is kept (sites are
                // keyed by entity id); a veto pulls every engaged site
                // back to IDLE, which is the only generic way to express
                // "stand down" without that index.
                for site in self.sites.values_mut() {
                    if matches!(site.engagement.phase, arenasim_core::enums::EngagementPhase::Engage | arenasim_core::enums::EngagementPhase::Target) {
                        site.engagement.phase = arenasim_core::enums::EngagementPhase::Idle;
                        site.engagement.target = None;
                        site.engagement.track_confidence = 0.0;
                    }
                }
            }
            SimCommand::QueueManeuverNode { entity_id, execute_at, prograde_mps, normal_mps, radial_mps } => {
                self.maneuver_queue.push(ManeuverNode { entity: entity_id, execute_at_s: execute_at, prograde_mps, normal_mps, radial_mps });
            }
        }
    }

    fn publish(&mut self) -> ObservableState {
        let mut entities = Vec::new();
        for id in self.registry.ids() {
            let Some(entity) = self.registry.get(id) else { continue };
            let Ok(team) = self.world.get::<&TeamTag>(entity) else { continue };
            let Ok(type_tag) = self.world.get::<&TypeTag>(entity) else { continue };
            let name = self.world.get::<&DisplayName>(entity).map(|d| d.0.clone()).unwrap_or_else(|_| id.clone());
            let alive = self.world.get::<&Active>(entity).map(|a| a.0).unwrap_or(true);
            let (position, speed_mps) = self.entity_position_and_speed(entity);
            let (track_number, classification) = self
                .world
                .get::<&arenasim_core::components::SensorRecord>(entity)
                .map(|s| (s.track_number, s.classification))
                .unwrap_or((None, Classification::Unknown));

            entities.push(observable::EntityObservable {
                id: id.clone(),
                name,
                team: team.0.clone(),
                entity_type: type_tag.0,
                position,
                speed_mps,
                track_number,
                classification,
                alive,
            });
        }

        observable::ObservableState {
            tick: self.sim_time.tick,
            elapsed_secs: self.sim_time.elapsed_secs,
            entities,
            conjunction_alerts: self.conjunction.alerts().iter().map(Into::into).collect(),
            maneuver_alerts: self.conjunction.maneuver_alerts().iter().map(Into::into).collect(),
            comms: observable::CommsSummary {
                delivery_rate: self.comm_engine.metrics().delivery_rate(),
                average_latency_s: self.comm_engine.metrics().average_latency_s(),
                throughput_bps: self.comm_engine.metrics().throughput_bps(),
                in_flight: self.comm_engine.in_flight_count(),
            },
            effects: self.effects.drain(),
        }
    }

    fn entity_position_and_speed(&self, entity: hecs::Entity) -> (Position, f64) {
        if let Ok(orbital) = self.world.get::<&OrbitalState>(entity) {
            return (orbital.eci_pos, orbital.eci_vel.speed());
        }
        if let Ok(flight) = self.world.get::<&arenasim_core::components::FlightRecord>(entity) {
            return (flight.eci_pos, flight.speed);
        }
        if let Ok(naval) = self.world.get::<&arenasim_core::components::NavalRecord>(entity) {
            let pos = arenasim_orbital::geodetic_to_eci(naval.lat, naval.lon, -naval.depth, self.sim_time.elapsed_secs);
            return (pos, naval.speed);
        }
        (Position::default(), 0.0)
    }

    /// Whether an entity still carries an undischarged weapon component
    /// with inventory remaining, for a bridge/operator query.
    pub fn entity_has_live_weapon(&self, id: &str) -> bool {
        let Some(entity) = self.registry.get(id) else { return false };
        self.world.get::<&WeaponComponent>(entity).map(|w| w.inventory.map(|n| n > 0).unwrap_or(true)).unwrap_or(false)
    }
}

/// Translate a scenario's free-form `{time, action, ...params}` event
/// into a `SimCommand` by re-serializing it the same shape `SimCommand`'s
/// `#[serde(tag = "action")]` expects. This is the one place scenario
/// authoring (an external collaborator) meets the command vocabulary.
fn event_to_command(event: &arenasim_scenario::ScheduledEvent) -> Result<SimCommand, serde_json::Error> {
    let mut value = serde_json::Value::Object(event.params.clone());
    if let Some(obj) = value.as_object_mut() {
        obj.insert("action".to_string(), serde_json::Value::String(event.action.clone()));
    }
    serde_json::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_scenario(json_entities: &str) -> ScenarioFile {
        let json = format!(r#"{{"metadata": {{"name": "t"}}, "entities": [{json_entities}]}}"#);
        arenasim_scenario::load(&json).unwrap()
    }

    #[test]
    fn tick_advances_sim_time_and_publishes_entities() {
        let scenario = minimal_scenario(
            r#"{"id": "sat-1", "name": "Sat 1", "type": "spacecraft", "team": "blue",
                "components": [{"type": "orbital_2body", "sma_m": 7000000.0, "ecc": 0.0,
                "inc_rad": 0.0, "raan_rad": 0.0, "argp_rad": 0.0, "true_anomaly_rad": 0.0}]}"#,
        );
        let mut sim = Simulation::new(&scenario, SimulationConfig::default());
        let state = sim.tick(0.1);
        assert_eq!(state.tick, 1);
        assert_eq!(state.entities.len(), 1);
        assert!(state.entities[0].speed_mps > 1000.0);
    }

    #[test]
    fn paused_simulation_does_not_advance_sim_time() {
        let scenario = minimal_scenario(
            r#"{"id": "a-1", "name": "A1", "type": "aircraft", "team": "blue",
                "components": [{"type": "atmospheric_3dof", "lat": 0.1, "lon": 0.1,
                "alt": 5000.0, "speed": 200.0, "heading": 0.5}]}"#,
        );
        let mut sim = Simulation::new(&scenario, SimulationConfig::default());
        sim.enqueue_command(SimCommand::Pause);
        let before = sim.sim_time().tick;
        sim.tick(0.1);
        assert_eq!(sim.sim_time().tick, before);
        assert!(sim.is_paused());
    }

    #[test]
    fn queued_maneuver_node_changes_orbital_velocity_once_due() {
        let scenario = minimal_scenario(
            r#"{"id": "sat-1", "name": "Sat 1", "type": "spacecraft", "team": "blue",
                "components": [{"type": "orbital_2body", "sma_m": 7000000.0, "ecc": 0.0,
                "inc_rad": 0.0, "raan_rad": 0.0, "argp_rad": 0.0, "true_anomaly_rad": 0.0}]}"#,
        );
        let mut sim = Simulation::new(&scenario, SimulationConfig::default());
        sim.enqueue_command(SimCommand::QueueManeuverNode {
            entity_id: "sat-1".to_string(),
            execute_at: 0.0,
            prograde_mps: 50.0,
            normal_mps: 0.0,
            radial_mps: 0.0,
        });
        let before = sim.tick(0.1).entities[0].speed_mps;
        let after = sim.tick(0.1).entities[0].speed_mps;
        assert!(after > before - 1.0, "expected burn to have already applied by the first tick, before={before} after={after}");
    }

    #[test]
    fn add_network_command_joins_members_and_creates_links() {
        let scenario = minimal_scenario(
            r#"{"id": "a-1", "name": "A1", "type": "aircraft", "team": "blue",
                "components": [{"type": "atmospheric_3dof", "lat": 0.1, "lon": 0.1,
                "alt": 5000.0, "speed": 200.0, "heading": 0.5}]}"#,
        );
        let mut sim = Simulation::new(&scenario, SimulationConfig::default());
        sim.enqueue_command(SimCommand::AddNetwork {
            network_id: "net-1".to_string(),
            topology: arenasim_core::enums::Topology::Mesh,
            members: vec!["a-1".to_string()],
        });
        sim.tick(0.1);
        let entity = sim.registry.get("a-1").unwrap();
        let comm = sim.world.get::<&CommRecord>(entity).unwrap();
        assert!(comm.network_ids.contains(&"net-1".to_string()));
    }
}
