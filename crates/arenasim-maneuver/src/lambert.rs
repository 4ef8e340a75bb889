//! Universal-variable Lambert solver.

use arenasim_core::constants::MU_EARTH;
use arenasim_core::types::{Position, Velocity};
use arenasim_orbital::{stumpff_c, stumpff_s};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct LambertResult {
    pub valid: bool,
    pub v1: Velocity,
    pub v2: Velocity,
}

fn y_of_z(z: f64, r1n: f64, r2n: f64, a: f64) -> f64 {
    let c = stumpff_c(z);
    let s = stumpff_s(z);
    r1n + r2n + a * (z * s - 1.0) / c.sqrt()
}

fn tof_of_z(z: f64, r1n: f64, r2n: f64, a: f64, mu: f64) -> f64 {
    let yv = y_of_z(z, r1n, r2n, a);
    if yv < 0.0 {
        return f64::NAN;
    }
    let c = stumpff_c(z);
    let s = stumpff_s(z);
    ((yv / c).powf(1.5) * s + a * yv.sqrt()) / mu.sqrt()
}

/// Smallest z for which `y(z) > 0`, swept inward from a lower bound
/// ("ensuring y(z_low) > 0 by inward sweep").
fn sweep_for_positive_y(mut z_low: f64, r1n: f64, r2n: f64, a: f64) -> f64 {
    while y_of_z(z_low, r1n, r2n, a) < 0.0 && z_low < 16.0 * PI * PI {
        z_low += 0.1;
    }
    z_low
}

/// Solve Lambert's problem for the transfer between `r1` and `r2` in time
/// `tof`, taking the short way if `short_way` else the long way. `mu`
/// defaults to Earth's gravitational parameter when `None`.
pub fn solve(r1: &Position, r2: &Position, tof: f64, short_way: bool, mu: Option<f64>) -> LambertResult {
    let mu = mu.unwrap_or(MU_EARTH);
    let r1n = r1.norm();
    let r2n = r2.norm();
    if r1n < 1.0 || r2n < 1.0 || tof <= 0.0 {
        return invalid();
    }

    let cross = r1.cross(r2);
    let cos_theta = (r1.dot(r2) / (r1n * r2n)).clamp(-1.0, 1.0);
    let mut theta = cos_theta.acos();
    let prograde_short = cross.z >= 0.0;
    if short_way != prograde_short {
        theta = 2.0 * PI - theta;
    }

    if theta.abs() < 1e-9 || (theta - 2.0 * PI).abs() < 1e-9 {
        return invalid(); // collinear, transfer angle undefined
    }

    let a = theta.sin() * (r1n * r2n / (1.0 - theta.cos())).sqrt();

    let mut z_low = sweep_for_positive_y(-4.0 * PI * PI, r1n, r2n, a);
    let mut z_high = 16.0 * PI * PI;

    // Damped Newton with a finite-difference derivative; fall back to
    // bisection on [z_low, z_high] if Newton steps outside the bracket.
    let mut z = 0.0_f64;
    let mut converged = false;
    for _ in 0..100 {
        let f = tof_of_z(z, r1n, r2n, a, mu) - tof;
        if f.is_nan() {
            z = (z_low + z_high) / 2.0;
            continue;
        }
        if f.abs() < 1e-6 {
            converged = true;
            break;
        }

        let h = 1e-4_f64.max(z.abs() * 1e-6);
        let f_plus = tof_of_z(z + h, r1n, r2n, a, mu);
        let f_minus = tof_of_z(z - h, r1n, r2n, a, mu);
        let deriv = if f_plus.is_nan() || f_minus.is_nan() {
            f64::NAN
        } else {
            (f_plus - f_minus) / (2.0 * h)
        };

        if f > 0.0 {
            z_high = z;
        } else {
            z_low = z;
        }

        let newton_z = if deriv.is_finite() && deriv.abs() > 1e-12 {
            z - 0.8 * f / deriv // damping factor keeps oscillation in check
        } else {
            f64::NAN
        };

        z = if newton_z.is_finite() && newton_z > z_low && newton_z < z_high {
            newton_z
        } else {
            (z_low + z_high) / 2.0
        };
    }

    if !converged {
        return invalid();
    }

    let yv = y_of_z(z, r1n, r2n, a);
    if yv < 0.0 {
        return invalid();
    }

    let f = 1.0 - yv / r1n;
    let g = a * (yv / mu).sqrt();
    let gdot = 1.0 - yv / r2n;

    if g.abs() < 1e-9 {
        return invalid();
    }

    let v1 = Velocity::new(
        (r2.x - f * r1.x) / g,
        (r2.y - f * r1.y) / g,
        (r2.z - f * r1.z) / g,
    );
    let v2 = Velocity::new(
        (gdot * r2.x - r1.x) / g,
        (gdot * r2.y - r1.y) / g,
        (gdot * r2.z - r1.z) / g,
    );

    LambertResult { valid: true, v1, v2 }
}

fn invalid() -> LambertResult {
    LambertResult { valid: false, v1: Velocity::default(), v2: Velocity::default() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenasim_orbital::propagate;

    #[test]
    fn lambert_transfer_arrives_at_target() {
        let r1 = Position::new(7_000_000.0, 0.0, 0.0);
        let r2 = Position::new(0.0, 9_000_000.0, 1_000_000.0);
        let tof = 3_600.0;

        let result = solve(&r1, &r2, tof, true, None);
        assert!(result.valid);

        let propagated = propagate(&r1, &result.v1, tof, MU_EARTH);
        assert!(propagated.valid);
        assert!(
            propagated.position.range_to(&r2) < 10.0,
            "Lambert arrival error: {} m",
            propagated.position.range_to(&r2)
        );
    }

    #[test]
    fn lambert_rejects_collinear_endpoints() {
        let r1 = Position::new(7_000_000.0, 0.0, 0.0);
        let r2 = Position::new(8_000_000.0, 0.0, 0.0);
        let result = solve(&r1, &r2, 1800.0, true, None);
        assert!(!result.valid);
    }

    #[test]
    fn short_and_long_way_give_different_transfers() {
        let r1 = Position::new(7_000_000.0, 0.0, 0.0);
        let r2 = Position::new(0.0, 7_000_000.0, 500_000.0);
        let short = solve(&r1, &r2, 2_000.0, true, None);
        let long = solve(&r1, &r2, 2_000.0, false, None);
        assert!(short.valid && long.valid);
        assert!(short.v1.speed() != long.v1.speed());
    }
}
