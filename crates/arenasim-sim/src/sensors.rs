//! Sensor fusion: radar scan/track (ground-based EW/TTR/FCR) and passive
//! sonar detection. Both write into each target's
//! `SensorRecord`; radar detections additionally feed the combat system
//! (`arenasim-sim::combat`) the bearing/range it needs to drive F2T2EA.

use std::collections::HashMap;

use arenasim_core::components::{AiComponent, NavalRecord, SensorRecord, TeamTag, TypeTag};
use arenasim_core::enums::{Classification, EntityType, Side};
use arenasim_core::EntityId;
use arenasim_iads::radar::{RadarConfig, RadarUnit};
use arenasim_orbital::frames::eci_to_geodetic;
use arenasim_sonar::{detect, ArrayType, PropagationContext};

use crate::physics::SnapshotMap;
use crate::world::EntityRegistry;

/// One radar's detection of one target this tick, handed to the combat
/// system to drive EW/TTR/FCR handoff.
#[derive(Debug, Clone)]
pub struct RadarDetection {
    pub radar_id: EntityId,
    pub target_id: EntityId,
    pub bearing_rad: f64,
    pub range_m: f64,
}

/// Build a radar's tuning from its AI ranges and role string. No
/// scenario field distinguishes EW/TTR/FCR directly; the convention is
/// that the radar's `Ai` role names its kind, e.g. `"ew_radar"`,
/// `"ttr"`, `"fcr"`.
fn radar_config_for(ai: &AiComponent) -> RadarConfig {
    let role = ai.role.to_lowercase();
    let kind = if role.contains("ttr") {
        arenasim_core::enums::RadarType::Ttr
    } else if role.contains("fcr") {
        arenasim_core::enums::RadarType::Fcr
    } else {
        arenasim_core::enums::RadarType::Ew
    };
    let (rotation_rate_rad_s, beamwidth_rad) = match kind {
        arenasim_core::enums::RadarType::Ew => (0.3, 0.15),
        arenasim_core::enums::RadarType::Ttr | arenasim_core::enums::RadarType::Fcr => (1.2, 0.03),
    };
    RadarConfig {
        kind,
        rotation_rate_rad_s,
        beamwidth_rad,
        max_range_m: if ai.detect_m > 0.0 { ai.detect_m } else { 400_000.0 },
        track_accuracy_m: 50.0,
    }
}

/// Lazily create a `RadarUnit` for every `Radar`-typed entity that
/// carries an `Ai` component, keyed by entity id. Built once at sim
/// start; radars never change kind mid-run.
pub fn build_radar_units(world: &hecs::World, registry: &EntityRegistry) -> HashMap<EntityId, RadarUnit> {
    let mut out = HashMap::new();
    for id in registry.ids() {
        let Some(entity) = registry.get(id) else { continue };
        let Ok(type_tag) = world.get::<&TypeTag>(entity) else { continue };
        if type_tag.0 != EntityType::Radar {
            continue;
        }
        let Ok(ai) = world.get::<&AiComponent>(entity) else { continue };
        out.insert(id.clone(), RadarUnit::new(radar_config_for(&ai)));
    }
    out
}

/// Step every radar's beam and test it against every opposing-side
/// entity in the frozen snapshot, updating `SensorRecord` on hits and
/// returning the raw detections for the combat system.
pub fn step_radar(
    world: &mut hecs::World,
    registry: &EntityRegistry,
    radars: &mut HashMap<EntityId, RadarUnit>,
    snapshot: &SnapshotMap,
    sim_time_secs: f64,
    dt: f64,
) -> Vec<RadarDetection> {
    let mut detections = Vec::new();

    let radar_positions: HashMap<EntityId, (arenasim_core::types::Position, Side)> = radars
        .keys()
        .filter_map(|id| {
            let snap = snapshot.get(id)?;
            let team = team_of(world, registry, id)?;
            Some((id.clone(), (snap.eci_pos, team)))
        })
        .collect();

    for (radar_id, radar) in radars.iter_mut() {
        let Some((radar_pos, radar_team)) = radar_positions.get(radar_id) else { continue };

        let bearing_to_assigned = radar.assigned_target.as_ref().and_then(|target| {
            let snap = snapshot.get(target)?;
            Some(bearing_between(radar_pos, &snap.eci_pos))
        });
        radar.step(dt, bearing_to_assigned);

        for id in registry.ids() {
            if id == radar_id {
                continue;
            }
            let Some(target_team) = team_of(world, registry, id) else { continue };
            if target_team == *radar_team {
                continue;
            }
            let Some(snap) = snapshot.get(id) else { continue };
            if !snap.alive {
                continue;
            }
            let range_m = radar_pos.range_to(&snap.eci_pos);
            let bearing_rad = bearing_between(radar_pos, &snap.eci_pos);
            if !radar.can_detect(bearing_rad, range_m) {
                continue;
            }
            detections.push(RadarDetection { radar_id: radar_id.clone(), target_id: id.clone(), bearing_rad, range_m });

            if let Some(entity) = registry.get(id) {
                if let Ok(mut sensor) = world.get::<&mut SensorRecord>(entity) {
                    sensor.hits += 1;
                    sensor.quality = (sensor.quality + 0.1).min(1.0);
                    if sensor.classification == Classification::Unknown {
                        sensor.classification = Classification::Pending;
                    } else if sensor.hits > 5 {
                        sensor.classification = if target_team == Side::Red { Classification::Hostile } else { Classification::Suspect };
                    }
                    if sensor.track_number.is_none() {
                        sensor.track_number = Some(track_number_for(id));
                    }
                }
            }
        }
    }

    let _ = sim_time_secs;
    detections
}

/// Passive sonar: every submerged/surface naval listener tests every
/// naval contact within its array's detection envelope.
pub fn step_sonar(world: &mut hecs::World, registry: &EntityRegistry) {
    let listeners: Vec<(EntityId, NavalRecord, Side)> = registry
        .ids()
        .filter_map(|id| {
            let entity = registry.get(id)?;
            let naval = world.get::<&NavalRecord>(entity).ok()?;
            let team = world.get::<&TeamTag>(entity).ok()?;
            Some((id.clone(), *naval, team.0.clone()))
        })
        .collect();

    for (listener_id, listener, listener_team) in &listeners {
        let array = if listener.is_submerged { ArrayType::Hull } else { ArrayType::Towed };
        for (target_id, target, target_team) in &listeners {
            if target_id == listener_id || *target_team == *listener_team {
                continue;
            }
            let range_m = great_circle_range_m(listener.lat, listener.lon, target.lat, target.lon);
            let ctx = PropagationContext {
                range_m,
                frequency_khz: 5.0,
                thermocline_depth_m: 100.0,
                listener_depth_m: listener.depth,
                target_depth_m: target.depth,
                surface_duct_enabled: false,
            };
            let speed_kts = target.speed * 1.943_844;
            let result = detect(speed_kts, true, !target.is_submerged, array, listener.sea_state, &ctx);
            if result.probability < 0.5 {
                continue;
            }
            let Some(entity) = registry.get(target_id) else { continue };
            let Ok(mut sensor) = world.get::<&mut SensorRecord>(entity) else { continue };
            sensor.hits += 1;
            sensor.quality = result.probability;
            if rank(result.classification) > rank(sensor.classification) {
                sensor.classification = result.classification;
            }
            if sensor.track_number.is_none() {
                sensor.track_number = Some(track_number_for(target_id));
            }
        }
    }
}

fn team_of(world: &hecs::World, registry: &EntityRegistry, id: &EntityId) -> Option<Side> {
    let entity = registry.get(id)?;
    world.get::<&TeamTag>(entity).ok().map(|t| t.0.clone())
}

fn bearing_between(from: &arenasim_core::types::Position, to: &arenasim_core::types::Position) -> f64 {
    let (lat_a, lon_a, _) = eci_to_geodetic(from, 0.0);
    let (lat_b, lon_b, _) = eci_to_geodetic(to, 0.0);
    let d_lon = lon_b - lon_a;
    let y = d_lon.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lon.cos();
    y.atan2(x).rem_euclid(std::f64::consts::TAU)
}

fn great_circle_range_m(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let d_lat = lat_b - lat_a;
    let d_lon = lon_b - lon_a;
    let a = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    arenasim_core::constants::EARTH_RADIUS_M * c
}

fn track_number_for(id: &EntityId) -> u32 {
    let mut hash: u32 = 2166136261;
    for b in id.as_bytes() {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    1000 + hash % 9000
}

/// Total order over classification confidence, since `Classification`
/// itself derives no ordering (its variants are a NATO identification
/// vocabulary, not a confidence scale).
fn rank(c: Classification) -> u8 {
    match c {
        Classification::Unknown => 0,
        Classification::Pending => 1,
        Classification::Neutral => 2,
        Classification::AssumedFriend => 3,
        Classification::Friend => 4,
        Classification::Suspect => 5,
        Classification::Hostile => 6,
    }
}
