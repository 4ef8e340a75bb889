//! Scenario entity spawning: turns a validated `ScenarioFile` into hecs
//! entities carrying the component records each subsystem expects.

use std::f64::consts::PI;

use arenasim_core::components::{
    Active, AiComponent, CommRecord, CyberRecord, DisplayName, EntityIdTag, FlightRecord,
    NavalRecord, OrbitalState, PositionHistory, RadarCrossSection, SensorRecord, TeamTag, TypeTag,
    WeaponComponent,
};
use arenasim_core::constants::MU_EARTH;
use arenasim_core::types::{Position, Velocity};
use arenasim_core::EntityId;
use arenasim_scenario::{ComponentSpec, ScenarioFile};

use crate::world::EntityRegistry;

/// Spawn every entity in a validated scenario into `world`, registering
/// each under its scenario-facing string ID.
pub fn spawn_scenario(world: &mut hecs::World, registry: &mut EntityRegistry, scenario: &ScenarioFile) {
    for entity in &scenario.entities {
        let Some(physics) = entity.physics_component() else { continue };

        let mut builder = hecs::EntityBuilder::new();
        builder.add(EntityIdTag(entity.id.clone()));
        builder.add(TeamTag(entity.team.clone()));
        builder.add(TypeTag(entity.entity_type));
        builder.add(DisplayName(entity.name.clone()));
        builder.add(RadarCrossSection { base_rcs_m2: default_rcs_m2(entity.entity_type) });
        let has_weapons = entity.components.iter().any(|c| matches!(c, ComponentSpec::Weapons { .. }));
        let is_command_node = entity.components.iter().any(|c| matches!(c, ComponentSpec::Ai { role, .. } if is_command_role(role)));
        builder.add(CommRecord { has_weapons, is_command_node, ..Default::default() });
        builder.add(SensorRecord::default());
        builder.add(CyberRecord::default());
        builder.add(PositionHistory::default());
        builder.add(Active::default());

        for component in &entity.components {
            match component {
                ComponentSpec::Ai { role, ranges } => {
                    builder.add(AiComponent {
                        role: role.clone(),
                        detect_m: ranges.detect_m,
                        engage_m: ranges.engage_m,
                    });
                }
                ComponentSpec::Weapons { weapon_type, pk, max_range_m, cooldown_s, inventory, salvo_size } => {
                    builder.add(WeaponComponent {
                        weapon_type: weapon_type.clone(),
                        pk: *pk,
                        max_range_m: *max_range_m,
                        cooldown_s: *cooldown_s,
                        inventory: *inventory,
                        salvo_size: salvo_size.unwrap_or(1),
                        cooldown_remaining_s: 0.0,
                    });
                }
                _ => {}
            }
        }

        match physics {
            ComponentSpec::Orbital2Body { sma_m, ecc, inc_rad, raan_rad, argp_rad, true_anomaly_rad } => {
                let (pos, vel) = elements_to_state(*sma_m, *ecc, *inc_rad, *raan_rad, *argp_rad, *true_anomaly_rad);
                builder.add(OrbitalState { eci_pos: pos, eci_vel: vel });
            }
            ComponentSpec::Atmospheric3Dof { lat, lon, alt, speed, heading, gamma, engine_on, throttle } => {
                builder.add(FlightRecord {
                    lat: *lat,
                    lon: *lon,
                    alt: *alt,
                    speed: *speed,
                    heading: *heading,
                    gamma: *gamma,
                    roll: 0.0,
                    throttle: *throttle,
                    engine_on: *engine_on,
                    aero_blend: 1.0,
                    eci_pos: Position::default(),
                    eci_vel: Velocity::default(),
                });
            }
            ComponentSpec::Ship { lat, lon, speed, heading } => {
                builder.add(NavalRecord {
                    lat: *lat,
                    lon: *lon,
                    depth: 0.0,
                    speed: *speed,
                    heading: *heading,
                    is_submerged: false,
                    sea_state: 2,
                });
            }
            ComponentSpec::Submarine { lat, lon, depth, speed, heading } => {
                builder.add(NavalRecord {
                    lat: *lat,
                    lon: *lon,
                    depth: *depth,
                    speed: *speed,
                    heading: *heading,
                    is_submerged: *depth > 0.0,
                    sea_state: 2,
                });
            }
            _ => unreachable!("physics_component only returns physics variants"),
        }

        let hecs_entity = world.spawn(builder.build());
        registry.insert(entity.id.clone(), hecs_entity);
    }
}

/// A node's AI role marks it as an F2T2EA command node (AWACS, ground
/// station, CAOC) the same way `sensors::radar_config_for` reads a
/// radar's role text to pick EW/TTR/FCR.
fn is_command_role(role: &str) -> bool {
    let role = role.to_lowercase();
    role.contains("command") || role.contains("awacs") || role.contains("ground_station") || role.contains("caoc")
}

fn default_rcs_m2(entity_type: arenasim_core::enums::EntityType) -> f64 {
    use arenasim_core::enums::EntityType::*;
    match entity_type {
        Aircraft => 5.0,
        Spacecraft => 10.0,
        SurfaceShip => 2_000.0,
        Submarine => 50.0,
        Radar | Jammer => 3.0,
        Missile | Torpedo => 0.3,
    }
}

/// Classical orbital elements -> ECI position/velocity, via the
/// perifocal frame. Companion to `arenasim_orbital::elements::from_state`,
/// needed here to instantiate a scenario's initial orbital state.
fn elements_to_state(
    sma_m: f64,
    ecc: f64,
    inc_rad: f64,
    raan_rad: f64,
    argp_rad: f64,
    true_anomaly_rad: f64,
) -> (Position, Velocity) {
    let p = sma_m * (1.0 - ecc * ecc);
    let r_mag = p / (1.0 + ecc * true_anomaly_rad.cos());

    let r_pf = Position::new(r_mag * true_anomaly_rad.cos(), r_mag * true_anomaly_rad.sin(), 0.0);
    let h = (MU_EARTH * p).sqrt();
    let v_pf = Velocity::new(
        -(MU_EARTH / h) * true_anomaly_rad.sin(),
        (MU_EARTH / h) * (ecc + true_anomaly_rad.cos()),
        0.0,
    );

    let (cos_o, sin_o) = (raan_rad.cos(), raan_rad.sin());
    let (cos_i, sin_i) = (inc_rad.cos(), inc_rad.sin());
    let (cos_w, sin_w) = (argp_rad.cos(), argp_rad.sin());

    // Standard 3-1-3 perifocal-to-ECI rotation (RAAN, inclination, arg periapsis).
    let r11 = cos_o * cos_w - sin_o * sin_w * cos_i;
    let r12 = -cos_o * sin_w - sin_o * cos_w * cos_i;
    let r21 = sin_o * cos_w + cos_o * sin_w * cos_i;
    let r22 = -sin_o * sin_w + cos_o * cos_w * cos_i;
    let r31 = sin_w * sin_i;
    let r32 = cos_w * sin_i;

    let pos = Position::new(
        r11 * r_pf.x + r12 * r_pf.y,
        r21 * r_pf.x + r22 * r_pf.y,
        r31 * r_pf.x + r32 * r_pf.y,
    );
    let vel = Velocity::new(
        r11 * v_pf.x + r12 * v_pf.y,
        r21 * v_pf.x + r22 * v_pf.y,
        r31 * v_pf.x + r32 * v_pf.y,
    );
    let _ = PI;
    (pos, vel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_equatorial_orbit_has_speed_matching_vis_viva() {
        let sma = 7_000_000.0;
        let (pos, vel) = elements_to_state(sma, 0.0, 0.0, 0.0, 0.0, 0.0);
        let expected_speed = (MU_EARTH / sma).sqrt();
        assert!((vel.speed() - expected_speed).abs() < 1e-3);
        assert!((pos.norm() - sma).abs() < 1e-3);
    }
}
