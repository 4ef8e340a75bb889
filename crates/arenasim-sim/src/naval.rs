//! Ship/submarine kinematics: constant-heading dead reckoning over the
//! WGS-sphere, mirroring the lat/lon integration `arenasim-flight` uses
//! for the atmospheric case but without an altitude/gamma degree of
//! freedom (Naval row: "Ship/sub kinematics").

use arenasim_core::components::NavalRecord;
use arenasim_core::constants::EARTH_RADIUS_M;

/// Advance every `NavalRecord` by `dt` seconds at its current speed and
/// heading. Depth and submerged state are commanded externally (events,
/// AI) and are not altered here.
pub fn step_naval(world: &mut hecs::World, dt: f64) {
    for (_, naval) in world.query_mut::<&mut NavalRecord>() {
        let r = EARTH_RADIUS_M - naval.depth;
        let d_lat_dt = naval.speed * naval.heading.cos() / r;
        let d_lon_dt = naval.speed * naval.heading.sin() / (r * naval.lat.cos().max(1e-6));
        naval.lat += d_lat_dt * dt;
        naval.lon += d_lon_dt * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_north_heading_increases_latitude() {
        let mut world = hecs::World::new();
        world.spawn((NavalRecord { lat: 0.2, lon: 0.1, depth: 0.0, speed: 10.0, heading: 0.0, is_submerged: false, sea_state: 2 },));
        step_naval(&mut world, 10.0);
        let (_, naval) = world.query_mut::<&NavalRecord>().into_iter().next().unwrap();
        assert!(naval.lat > 0.2);
    }
}
