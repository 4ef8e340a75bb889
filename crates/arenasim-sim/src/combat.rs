//! IADS engagement: per-site F2T2EA state machine driving SAM launch
//! and PN flyout. One `Engagement` + missile list is owned per
//! weapon-carrying entity; guidance itself runs in a local ENU tangent
//! plane centered on the launching site, per
//! `arenasim_iads::guidance`'s doc comment.

use std::collections::HashMap;

use arenasim_core::components::{Active, WeaponComponent};
use arenasim_core::enums::AssessResult;
use arenasim_core::types::{Position, Velocity};
use arenasim_core::EntityId;
use arenasim_effects::EffectsBus;
use arenasim_iads::engagement::{Engagement, EngagementConfig};
use arenasim_iads::guidance::{self, GuidanceConfig, MissileState};
use arenasim_orbital::frames::eci_to_geodetic;

use crate::physics::SnapshotMap;
use crate::sensors::RadarDetection;
use crate::world::EntityRegistry;

/// One weapon site's engagement state plus its in-flight rounds.
pub struct EngagementSite {
    pub engagement: Engagement,
    pub config: EngagementConfig,
    pub guidance: GuidanceConfig,
    pub missiles: Vec<(MissileState, EntityId)>,
}

/// Lazily create one `EngagementSite` per entity carrying a
/// `WeaponComponent`, keyed by entity id.
pub fn build_sites(world: &hecs::World, registry: &EntityRegistry) -> HashMap<EntityId, EngagementSite> {
    let mut out = HashMap::new();
    for id in registry.ids() {
        let Some(entity) = registry.get(id) else { continue };
        let Ok(weapon) = world.get::<&WeaponComponent>(entity) else { continue };
        let magazine = weapon.inventory.unwrap_or(4);
        out.insert(
            id.clone(),
            EngagementSite {
                engagement: Engagement::new(magazine),
                config: EngagementConfig { salvo_size: weapon.salvo_size, ..EngagementConfig::default() },
                guidance: GuidanceConfig::default(),
                missiles: Vec::new(),
            },
        );
    }
    out
}

/// Advance every site's F2T2EA state machine from this tick's radar
/// detections, launch salvos, fly out missiles, and assess hits.
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut hecs::World,
    registry: &EntityRegistry,
    sites: &mut HashMap<EntityId, EngagementSite>,
    detections: &[RadarDetection],
    snapshot: &SnapshotMap,
    effects: &mut EffectsBus,
    tick: u64,
    dt: f64,
    weapons_free: bool,
) {
    let mut by_radar: HashMap<&EntityId, Vec<&RadarDetection>> = HashMap::new();
    for d in detections {
        by_radar.entry(&d.radar_id).or_default().push(d);
    }

    for (site_id, site) in sites.iter_mut() {
        let Some(site_snapshot) = snapshot.get(site_id) else { continue };
        let (site_lat, site_lon, _) = eci_to_geodetic(&site_snapshot.eci_pos, 0.0);

        if let Some(site_detections) = by_radar.get(site_id) {
            for d in site_detections.iter() {
                let current_target = site.engagement.target.clone();
                drive_engagement(&mut site.engagement, &site.config, &current_target, &d.target_id);
            }
        }

        if weapons_free && site.engagement.phase == arenasim_core::enums::EngagementPhase::Target {
            if site.engagement.on_engage(&site.config) {
                if let Some(target_id) = site.engagement.target.clone() {
                    if let Some(target_snapshot) = snapshot.get(&target_id) {
                        let (lat, lon, alt) = eci_to_geodetic(&target_snapshot.eci_pos, 0.0);
                        let target_local = enu_offset(site_lat, site_lon, lat, lon, alt);
                        let launch_vel_dir = target_local.norm().max(1.0);
                        let launch_vel = Velocity::new(
                            target_local.x / launch_vel_dir * 50.0,
                            target_local.y / launch_vel_dir * 50.0,
                            300.0,
                        );
                        site.missiles.push((MissileState::launch(Position::new(0.0, 0.0, 5.0), launch_vel), target_id));
                    }
                }
            }
        }

        let mut resolved = Vec::new();
        for (missile, target_id) in site.missiles.iter_mut() {
            let Some(target_snapshot) = snapshot.get(target_id) else { continue };
            let (lat, lon, alt) = eci_to_geodetic(&target_snapshot.eci_pos, 0.0);
            let target_local = enu_offset(site_lat, site_lon, lat, lon, alt);
            let target_vel_local = Velocity::default();
            guidance::step(missile, &site.guidance, &target_local, &target_vel_local, dt);

            match missile.state {
                arenasim_core::enums::SamState::Hit => {
                    effects.explosion(target_snapshot.eci_pos, Some(site_id.clone()), tick, 0.0, 15.0);
                    if let Some(target_entity) = registry.get(target_id) {
                        if let Ok(mut active) = world.get::<&mut Active>(target_entity) {
                            active.0 = false;
                        }
                    }
                    resolved.push(AssessResult::Hit);
                }
                arenasim_core::enums::SamState::Miss => resolved.push(AssessResult::Miss),
                _ => {}
            }
        }
        site.missiles.retain(|(m, _)| {
            !matches!(m.state, arenasim_core::enums::SamState::Hit | arenasim_core::enums::SamState::Miss)
        });

        for result in resolved {
            site.engagement.on_flight_resolved();
            site.engagement.on_assess(result);
        }
    }
}

/// Drive the FSM forward from whatever detection continuity implies:
/// a fresh target starts FIND; repeated detections of the same target
/// progress FIX -> TRACK -> TARGET, mirroring a site whose EW hands
/// continuous contact straight to its own TTR/FCR.
fn drive_engagement(engagement: &mut Engagement, config: &EngagementConfig, current_target: &Option<EntityId>, detected: &EntityId) {
    match engagement.phase {
        arenasim_core::enums::EngagementPhase::Idle => engagement.on_ew_detect(detected.clone()),
        arenasim_core::enums::EngagementPhase::Find if current_target.as_deref() == Some(detected.as_str()) => {
            engagement.on_ttr_handoff();
        }
        arenasim_core::enums::EngagementPhase::Fix | arenasim_core::enums::EngagementPhase::Track
            if current_target.as_deref() == Some(detected.as_str()) =>
        {
            engagement.on_ttr_update(config);
        }
        _ => {}
    }
}

/// Offset from `(site_lat, site_lon)` (alt 0) to `(lat, lon, alt)` in a
/// local ENU tangent-plane frame, flat-Earth approximation (valid over
/// SAM engagement ranges, per `arenasim_iads::guidance`'s doc comment).
fn enu_offset(site_lat: f64, site_lon: f64, lat: f64, lon: f64, alt: f64) -> Position {
    let r = arenasim_core::constants::EARTH_RADIUS_M;
    let north = (lat - site_lat) * r;
    let east = (lon - site_lon) * r * site_lat.cos().max(1e-6);
    Position::new(east, north, alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_fsm_progresses_on_repeated_detection() {
        let mut e = Engagement::new(2);
        let cfg = EngagementConfig::default();
        let target = "tgt-1".to_string();
        drive_engagement(&mut e, &cfg, &None, &target);
        assert_eq!(e.phase, arenasim_core::enums::EngagementPhase::Find);
        e.target = Some(target.clone());
        drive_engagement(&mut e, &cfg, &e.target.clone(), &target);
        assert_eq!(e.phase, arenasim_core::enums::EngagementPhase::Fix);
    }
}
