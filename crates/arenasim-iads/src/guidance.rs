//! Proportional-navigation SAM guidance and 3-DOF flight-out integration.
//! Engagement geometry is resolved in a flat local tangent-plane frame
//! (x = east, y = north, z = up, meters): SAM engagement ranges are
//! short enough that Earth curvature is negligible, unlike the
//! orbital/atmospheric propagators which must track geodetic position
//! globally.

use arenasim_core::constants::G0;
use arenasim_core::enums::SamState;
use arenasim_core::types::{Position, Velocity};

#[derive(Debug, Clone, Copy)]
pub struct GuidanceConfig {
    /// Navigation constant N, dimensionless (typically 3-5).
    pub nav_constant: f64,
    pub max_g: f64,
    pub kill_radius_m: f64,
    pub burn_time_s: f64,
    pub min_terminal_speed_mps: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            nav_constant: 4.0,
            max_g: 30.0,
            kill_radius_m: 15.0,
            burn_time_s: 6.0,
            min_terminal_speed_mps: 80.0,
        }
    }
}

/// In-flight SAM state, local tangent-plane coordinates.
#[derive(Debug, Clone, Copy)]
pub struct MissileState {
    pub pos: Position,
    pub vel: Velocity,
    pub time_of_flight_s: f64,
    pub state: SamState,
}

impl MissileState {
    pub fn launch(pos: Position, vel: Velocity) -> Self {
        Self { pos, vel, time_of_flight_s: 0.0, state: SamState::Flying }
    }
}

fn vel_as_pos(v: &Velocity) -> Position {
    Position::new(v.x, v.y, v.z)
}

/// One PN guidance + integration step. `target_pos`/`target_vel` are the
/// target's current state in the same local frame.
pub fn step(
    missile: &mut MissileState,
    cfg: &GuidanceConfig,
    target_pos: &Position,
    target_vel: &Velocity,
    dt: f64,
) {
    if missile.state != SamState::Flying && missile.state != SamState::Terminal {
        return;
    }

    let rel_pos = target_pos.sub(&missile.pos);
    let rel_vel = target_vel.sub(&missile.vel);
    let range = rel_pos.norm();

    if range < cfg.kill_radius_m {
        missile.state = SamState::Hit;
        return;
    }

    let closing_velocity = -(rel_pos.dot(&vel_as_pos(&rel_vel))) / range.max(1e-6);

    // Line-of-sight angular rate vector, omega = (r x v) / |r|^2; already
    // perpendicular to the LOS by construction.
    let omega = rel_pos.cross(&vel_as_pos(&rel_vel));
    let omega = Position::new(
        omega.x / (range * range).max(1e-6),
        omega.y / (range * range).max(1e-6),
        omega.z / (range * range).max(1e-6),
    );

    let scale = cfg.nav_constant * closing_velocity;
    let mut a_cmd = Position::new(omega.x * scale, omega.y * scale, omega.z * scale);
    let a_cmd_mag = a_cmd.norm();
    let max_accel = cfg.max_g * G0;
    if a_cmd_mag > max_accel && a_cmd_mag > 1e-9 {
        let k = max_accel / a_cmd_mag;
        a_cmd = Position::new(a_cmd.x * k, a_cmd.y * k, a_cmd.z * k);
    }

    // Gravity, local tangent plane.
    let accel = Velocity::new(a_cmd.x, a_cmd.y, a_cmd.z - G0);

    missile.vel = Velocity::new(
        missile.vel.x + accel.x * dt,
        missile.vel.y + accel.y * dt,
        missile.vel.z + accel.z * dt,
    );
    missile.pos = missile.pos.add_scaled(&vel_as_pos(&missile.vel), dt);
    missile.time_of_flight_s += dt;

    if missile.time_of_flight_s >= cfg.burn_time_s {
        missile.state = SamState::Terminal;
    }

    let speed = missile.vel.speed();
    let post_burn = missile.time_of_flight_s >= cfg.burn_time_s;

    if missile.pos.z <= 0.0 {
        missile.state = SamState::Miss;
    } else if post_burn && speed < cfg.min_terminal_speed_mps {
        missile.state = SamState::Miss;
    } else if post_burn && closing_velocity < 0.0 {
        // Range is diverging in the terminal phase: the intercept
        // window has passed.
        missile.state = SamState::Miss;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_intercept_hits() {
        let cfg = GuidanceConfig::default();
        let mut missile = MissileState::launch(Position::new(0.0, 0.0, 100.0), Velocity::new(0.0, 0.0, 900.0));
        let target_pos = Position::new(0.0, 8_000.0, 6_000.0);
        let target_vel = Velocity::new(0.0, -250.0, 0.0);

        let mut hit = false;
        let mut t_pos = target_pos;
        for _ in 0..400 {
            step(&mut missile, &cfg, &t_pos, &target_vel, 0.05);
            t_pos = t_pos.add_scaled(&Position::new(target_vel.x, target_vel.y, target_vel.z), 0.05);
            if missile.state == SamState::Hit {
                hit = true;
                break;
            }
            if missile.state == SamState::Miss {
                break;
            }
        }
        assert!(hit, "expected intercept, final state {:?}", missile.state);
    }

    #[test]
    fn ground_impact_is_a_miss() {
        let cfg = GuidanceConfig::default();
        let mut missile = MissileState::launch(Position::new(0.0, 0.0, 5.0), Velocity::new(0.0, 0.0, -50.0));
        let target_pos = Position::new(50_000.0, 50_000.0, 50_000.0);
        let target_vel = Velocity::new(0.0, 0.0, 0.0);
        step(&mut missile, &cfg, &target_pos, &target_vel, 0.2);
        assert_eq!(missile.state, SamState::Miss);
    }

    #[test]
    fn commanded_acceleration_is_clamped_to_max_g() {
        let cfg = GuidanceConfig { nav_constant: 1000.0, ..GuidanceConfig::default() };
        let mut missile = MissileState::launch(Position::new(0.0, 0.0, 1000.0), Velocity::new(0.0, 500.0, 0.0));
        let target_pos = Position::new(5_000.0, 1_000.0, 1_500.0);
        let target_vel = Velocity::new(-400.0, 0.0, 0.0);
        let speed_before = missile.vel.speed();
        step(&mut missile, &cfg, &target_pos, &target_vel, 0.01);
        let accel_mag = (missile.vel.speed() - speed_before).abs() / 0.01;
        assert!(accel_mag <= cfg.max_g * G0 + G0 + 1.0);
    }
}
