//! Bridges the hecs world to `arenasim_comms::CommEngine`: builds the
//! frozen position/bricked/compromised maps the engine needs each tick,
//! applies delivered packets back onto entity state, and triggers
//! F2T2EA distribution when a track packet reaches a command node
//!

use std::collections::HashMap;

use arenasim_comms::datalink::TrackSnapshot;
use arenasim_comms::CommEngine;
use arenasim_core::components::{Active, CommRecord, CyberRecord, FlightRecord, NavalRecord, OrbitalState, WeaponComponent};
use arenasim_core::enums::PacketType;
use arenasim_core::types::Position;
use arenasim_core::EntityId;
use arenasim_orbital::frames::eci_to_geodetic;
use rand_chacha::ChaCha8Rng;

use crate::physics::SnapshotMap;
use crate::sensors::RadarDetection;
use crate::world::EntityRegistry;

/// Positions (ECI), bricked/compromised flags, and liveness for every
/// comms-capable entity, gathered once per link-budget step.
pub struct CommsFrame {
    pub positions: HashMap<EntityId, Position>,
    pub bricked: HashMap<EntityId, bool>,
    pub compromised: HashMap<EntityId, bool>,
    pub alive: HashMap<EntityId, bool>,
    pub ddos_multiplier: HashMap<EntityId, f64>,
}

pub fn gather_frame(world: &hecs::World, registry: &EntityRegistry, snapshot: &SnapshotMap) -> CommsFrame {
    let mut frame = CommsFrame {
        positions: HashMap::new(),
        bricked: HashMap::new(),
        compromised: HashMap::new(),
        alive: HashMap::new(),
        ddos_multiplier: HashMap::new(),
    };
    for id in registry.ids() {
        let Some(entity) = registry.get(id) else { continue };
        let Ok(comm) = world.get::<&CommRecord>(entity) else { continue };
        let Some(snap) = snapshot.get(id) else { continue };
        frame.positions.insert(id.clone(), snap.eci_pos);
        frame.bricked.insert(id.clone(), comm.bricked);
        frame.compromised.insert(id.clone(), comm.compromised);
        let alive = world.get::<&Active>(entity).map(|a| a.0).unwrap_or(true);
        frame.alive.insert(id.clone(), alive && snap.alive);
        let ddos = world.get::<&CyberRecord>(entity).map(|c| c.ddos_multiplier).unwrap_or(1.0);
        frame.ddos_multiplier.insert(id.clone(), ddos);
    }
    frame
}

/// Advance cyber attacks and the physical link budget for this tick.
pub fn step_cyber_and_links(world: &mut hecs::World, registry: &EntityRegistry, engine: &mut CommEngine, frame: &CommsFrame, dt: f64) {
    let mut comm_records = HashMap::new();
    let mut cyber_records = HashMap::new();
    for id in registry.ids() {
        let Some(entity) = registry.get(id) else { continue };
        if let Ok(comm) = world.get::<&CommRecord>(entity) {
            comm_records.insert(id.clone(), comm.clone());
        }
        if let Ok(cyber) = world.get::<&CyberRecord>(entity) {
            cyber_records.insert(id.clone(), cyber.clone());
        }
    }
    engine.step_cyber(dt, &mut comm_records, &mut cyber_records);
    for (id, comm) in comm_records {
        if let Some(entity) = registry.get(&id) {
            if let Ok(mut rec) = world.get::<&mut CommRecord>(entity) {
                *rec = comm;
            }
        }
    }
    for (id, cyber) in cyber_records {
        if let Some(entity) = registry.get(&id) {
            if let Ok(mut rec) = world.get::<&mut CyberRecord>(entity) {
                *rec = cyber;
            }
        }
    }
    engine.step_link_budget(&frame.positions, &frame.bricked, &frame.compromised, &frame.ddos_multiplier);
}

/// Enqueue one track packet per detected target, from the detecting
/// radar to every command node sharing a network with it, at the
/// tactical-datalink rate.
pub fn enqueue_track_packets(world: &hecs::World, registry: &EntityRegistry, engine: &mut CommEngine, detections: &[RadarDetection], sim_time_secs: f64) {
    for d in detections {
        let Some(radar_entity) = registry.get(&d.radar_id) else { continue };
        let Ok(radar_comm) = world.get::<&CommRecord>(radar_entity) else { continue };
        for network_id in &radar_comm.network_ids {
            for id in registry.ids() {
                if id == &d.radar_id {
                    continue;
                }
                let Some(entity) = registry.get(id) else { continue };
                let Ok(comm) = world.get::<&CommRecord>(entity) else { continue };
                if !comm.is_command_node || !comm.network_ids.contains(network_id) {
                    continue;
                }
                let packet_id = engine.next_packet_id("trk");
                let packet = arenasim_comms::packet::Packet::new(
                    packet_id,
                    PacketType::Track,
                    6,
                    d.radar_id.clone(),
                    id.clone(),
                    network_id.clone(),
                    10.0,
                    256,
                    sim_time_secs,
                );
                engine.enqueue_packet(packet);
            }
        }
    }
}

/// Advance in-flight packets one hop and distribute targeting packets
/// for any track packet that reaches a command node.
pub fn advance_and_distribute(
    world: &hecs::World,
    registry: &EntityRegistry,
    engine: &mut CommEngine,
    frame: &CommsFrame,
    sim_time_secs: f64,
    dt: f64,
    rng: &mut ChaCha8Rng,
) {
    let delivered = engine.advance_packets(sim_time_secs, dt, &frame.alive, rng);
    for outcome in delivered {
        let packet = outcome.packet;
        if packet.packet_type != PacketType::Track {
            continue;
        }
        let Some(entity) = registry.get(&packet.destination) else { continue };
        let Ok(comm) = world.get::<&CommRecord>(entity) else { continue };
        if !comm.is_command_node {
            continue;
        }
        let weapon_nodes: Vec<EntityId> = comm
            .network_ids
            .iter()
            .flat_map(|net| {
                registry.ids().filter(move |id| {
                    registry
                        .get(id)
                        .and_then(|e| world.get::<&CommRecord>(e).ok().map(|c| c.network_ids.contains(net)))
                        .unwrap_or(false)
                        && registry.get(id).map(|e| world.get::<&WeaponComponent>(e).is_ok()).unwrap_or(false)
                })
            })
            .cloned()
            .collect();
        if weapon_nodes.is_empty() {
            continue;
        }
        let Some(source_entity) = registry.get(&packet.source) else { continue };
        let Some(track) = track_snapshot_for(world, source_entity) else { continue };
        let latency_s = 0.1;
        engine.distribute_f2t2ea(&packet.destination, &packet.network_id, &weapon_nodes, &track, latency_s, sim_time_secs, 10.0);
    }
}

fn track_snapshot_for(world: &hecs::World, entity: hecs::Entity) -> Option<TrackSnapshot> {
    if let Ok(flight) = world.get::<&FlightRecord>(entity) {
        return Some(TrackSnapshot { lat: flight.lat, lon: flight.lon, speed: flight.speed, heading: flight.heading });
    }
    if let Ok(naval) = world.get::<&NavalRecord>(entity) {
        return Some(TrackSnapshot { lat: naval.lat, lon: naval.lon, speed: naval.speed, heading: naval.heading });
    }
    if let Ok(orbital) = world.get::<&OrbitalState>(entity) {
        let (lat, lon, _) = eci_to_geodetic(&orbital.eci_pos, 0.0);
        return Some(TrackSnapshot { lat, lon, speed: orbital.eci_vel.speed(), heading: orbital.eci_vel.heading() });
    }
    None
}

/// Star-topology self-heal inputs: liveness and a crude "score" (comm
/// record command-node flag outweighs all else) used to pick the next hub.
pub fn self_heal(world: &hecs::World, registry: &EntityRegistry, engine: &mut CommEngine, frame: &CommsFrame) {
    let mut score = HashMap::new();
    for id in registry.ids() {
        let Some(entity) = registry.get(id) else { continue };
        let is_command = world.get::<&CommRecord>(entity).map(|c| c.is_command_node).unwrap_or(false);
        score.insert(id.clone(), if is_command { 1.0 } else { 0.0 });
    }
    engine.self_heal(&frame.alive, &score);
}
