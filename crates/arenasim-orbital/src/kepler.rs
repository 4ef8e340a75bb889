//! Universal-variable (f, g) Kepler propagation, valid for elliptical and
//! hyperbolic orbits alike. Ported from the classic Curtis/Vallado
//! formulation.

use arenasim_core::types::{Position, Velocity};

const MAX_ITERATIONS: usize = 50;
const CONVERGENCE_TOL: f64 = 1e-8;

/// Stumpff function C(z).
pub fn stumpff_c(z: f64) -> f64 {
    if z > 1e-6 {
        let sz = z.sqrt();
        (1.0 - sz.cos()) / z
    } else if z < -1e-6 {
        let sz = (-z).sqrt();
        (sz.cosh() - 1.0) / (-z)
    } else {
        // Series expansion near z = 0, avoids the 0/0 cancellation.
        1.0 / 2.0 - z / 24.0 + z * z / 720.0 - z * z * z / 40_320.0
    }
}

/// Stumpff function S(z).
pub fn stumpff_s(z: f64) -> f64 {
    if z > 1e-6 {
        let sz = z.sqrt();
        (sz - sz.sin()) / sz.powi(3)
    } else if z < -1e-6 {
        let sz = (-z).sqrt();
        (sz.sinh() - sz) / sz.powi(3)
    } else {
        1.0 / 6.0 - z / 120.0 + z * z / 5_040.0 - z * z * z / 362_880.0
    }
}

/// Result of propagating a two-body state. `valid = false` signals the
/// Newton iteration failed to converge; this is a normal, representable
/// outcome rather than a panic or `Result::Err`.
#[derive(Debug, Clone, Copy)]
pub struct PropagationResult {
    pub position: Position,
    pub velocity: Velocity,
    pub valid: bool,
    pub iterations: usize,
}

/// Propagate `(r0, v0)` forward by `dt` seconds under two-body gravity with
/// parameter `mu`. Converges for elliptical and hyperbolic orbits within
/// ~20 Newton iterations for `dt` up to one period.
pub fn propagate(r0: &Position, v0: &Velocity, dt: f64, mu: f64) -> PropagationResult {
    let r0mag = r0.norm();
    let v0mag = v0.speed();
    if r0mag < 1e-6 || mu <= 0.0 {
        return PropagationResult { position: *r0, velocity: *v0, valid: false, iterations: 0 };
    }

    let vr0 = (r0.x * v0.x + r0.y * v0.y + r0.z * v0.z) / r0mag;
    let alpha = 2.0 / r0mag - v0mag * v0mag / mu;

    let sqrt_mu = mu.sqrt();
    let mut chi = if alpha.abs() > 1e-10 {
        sqrt_mu * alpha * dt
    } else {
        // Near-parabolic: seed from angular momentum instead of 1/a.
        let h = r0.cross(&v0.as_position()).norm();
        sqrt_mu * dt / (r0mag + h.max(1.0))
    };

    let mut converged = false;
    let mut iterations = 0;
    for i in 0..MAX_ITERATIONS {
        iterations = i + 1;
        let z = chi * chi * alpha;
        let c = stumpff_c(z);
        let s = stumpff_s(z);

        let f_chi = (r0mag * vr0 / sqrt_mu) * chi * chi * c
            + (1.0 - alpha * r0mag) * chi.powi(3) * s
            + r0mag * chi
            - sqrt_mu * dt;

        let df_dchi = (r0mag * vr0 / sqrt_mu) * chi * (1.0 - alpha * chi * chi * s)
            + (1.0 - alpha * r0mag) * chi * chi * c
            + r0mag;

        if df_dchi.abs() < 1e-14 {
            break;
        }

        let ratio = f_chi / df_dchi;
        chi -= ratio;

        if ratio.abs() < CONVERGENCE_TOL {
            converged = true;
            break;
        }
    }

    if !converged {
        return PropagationResult { position: *r0, velocity: *v0, valid: false, iterations };
    }

    let z = chi * chi * alpha;
    let c = stumpff_c(z);
    let s = stumpff_s(z);

    let f = 1.0 - (chi * chi / r0mag) * c;
    let g = dt - (chi.powi(3) / sqrt_mu) * s;

    let r_vec = Position::new(
        f * r0.x + g * v0.x,
        f * r0.y + g * v0.y,
        f * r0.z + g * v0.z,
    );
    let rmag = r_vec.norm();
    if rmag < 1e-6 {
        return PropagationResult { position: *r0, velocity: *v0, valid: false, iterations };
    }

    let fdot = (sqrt_mu / (rmag * r0mag)) * (alpha * chi.powi(3) * s - chi);
    let gdot = 1.0 - (chi * chi / rmag) * c;

    let v_vec = Velocity::new(
        fdot * r0.x + gdot * v0.x,
        fdot * r0.y + gdot * v0.y,
        fdot * r0.z + gdot * v0.z,
    );

    PropagationResult { position: r_vec, velocity: v_vec, valid: true, iterations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenasim_core::constants::MU_EARTH;

    #[test]
    fn circular_leo_returns_to_start_after_one_period() {
        let r0_mag = 7_000_000.0_f64;
        let v0_mag = (MU_EARTH / r0_mag).sqrt();
        let r0 = Position::new(r0_mag, 0.0, 0.0);
        let v0 = Velocity::new(0.0, v0_mag, 0.0);
        let period = 2.0 * std::f64::consts::PI * (r0_mag.powi(3) / MU_EARTH).sqrt();

        let result = propagate(&r0, &v0, period, MU_EARTH);
        assert!(result.valid);
        assert!(
            result.position.range_to(&r0) < 1_000.0,
            "distance from start after one period: {}",
            result.position.range_to(&r0)
        );
    }

    #[test]
    fn sma_is_conserved_without_maneuvers() {
        let r0_mag = 7_200_000.0;
        let v0_mag = (MU_EARTH / r0_mag).sqrt() * 1.05; // mildly elliptical
        let r0 = Position::new(r0_mag, 0.0, 0.0);
        let v0 = Velocity::new(0.0, v0_mag, 100.0);

        let a0 = {
            let energy = v0.speed().powi(2) / 2.0 - MU_EARTH / r0.norm();
            -MU_EARTH / (2.0 * energy)
        };

        let mut r = r0;
        let mut v = v0;
        for _ in 0..500 {
            let step = propagate(&r, &v, 10.0, MU_EARTH);
            assert!(step.valid);
            r = step.position;
            v = step.velocity;
        }

        let a1 = {
            let energy = v.speed().powi(2) / 2.0 - MU_EARTH / r.norm();
            -MU_EARTH / (2.0 * energy)
        };

        assert!((a1 - a0).abs() / a0 < 0.001, "a0={a0} a1={a1}");
    }

    #[test]
    fn hyperbolic_orbit_converges() {
        let r0 = Position::new(7_000_000.0, 0.0, 0.0);
        let v0 = Velocity::new(0.0, 15_000.0, 0.0); // well above escape velocity
        let result = propagate(&r0, &v0, 3600.0, MU_EARTH);
        assert!(result.valid);
        assert!(result.position.norm() > r0.norm());
    }

    #[test]
    fn stumpff_series_matches_closed_form_near_zero() {
        let z = 1e-7;
        let c_series = stumpff_c(z);
        let c_closed = (1.0 - z.sqrt().cos()) / z;
        assert!((c_series - c_closed).abs() < 1e-4);
    }
}
