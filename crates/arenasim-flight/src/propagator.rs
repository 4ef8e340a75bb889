//! 3-DOF atmospheric flight propagation, blended seamlessly into vacuum
//! two-body propagation above ~80 km.

use arenasim_atmosphere as atmo;
use arenasim_core::components::FlightRecord;
use arenasim_core::constants::{EARTH_RADIUS_M, G0, MU_EARTH};
use arenasim_orbital::{frames, kepler};
use arenasim_weather::wind;
use arenasim_weather::WeatherModel;

use crate::controls::{AircraftPerformance, FlightControls};

/// Altitude (m) below which the propagator is purely aerodynamic.
const AERO_BLEND_FLOOR_M: f64 = 60_000.0;
/// Altitude (m) above which the propagator is purely orbital.
const AERO_BLEND_CEIL_M: f64 = 100_000.0;

/// Scalar mixing aerodynamic acceleration against vacuum two-body
/// gravity ("aeroblend"). 1.0 = fully aerodynamic, 0.0 = fully vacuum.
pub fn aero_blend_for_altitude(alt_m: f64) -> f64 {
    if alt_m <= AERO_BLEND_FLOOR_M {
        1.0
    } else if alt_m >= AERO_BLEND_CEIL_M {
        0.0
    } else {
        1.0 - (alt_m - AERO_BLEND_FLOOR_M) / (AERO_BLEND_CEIL_M - AERO_BLEND_FLOOR_M)
    }
}

/// Advance one atmospheric/orbital-blended flight state by `dt` seconds.
#[allow(clippy::too_many_arguments)]
pub fn step(
    state: &mut FlightRecord,
    controls: &FlightControls,
    perf: &AircraftPerformance,
    weather: &WeatherModel,
    sim_time_secs: f64,
    dt: f64,
) {
    let aero_blend = aero_blend_for_altitude(state.alt);
    state.aero_blend = aero_blend;

    let aero_next = integrate_aerodynamic(state, controls, perf, weather, dt);

    // Sync the ECI cache from the current (pre-step) local state so the
    // orbital propagator always starts from a consistent frame.
    let r0 = frames::geodetic_to_eci(state.lat, state.lon, state.alt, sim_time_secs);
    let v0 = frames::geodetic_velocity_to_eci(
        state.lat, state.lon, state.alt, state.speed, state.heading, state.gamma, sim_time_secs,
    );
    let kepler_result = kepler::propagate(&r0, &v0, dt, MU_EARTH);

    if aero_blend >= 1.0 || !kepler_result.valid {
        *state = aero_next;
        state.eci_pos = frames::geodetic_to_eci(state.lat, state.lon, state.alt, sim_time_secs + dt);
        state.eci_vel = frames::geodetic_velocity_to_eci(
            state.lat, state.lon, state.alt, state.speed, state.heading, state.gamma, sim_time_secs + dt,
        );
        return;
    }

    // Blend the two candidate ECI end-states directly: the aeroblend
    // interpolation applied to the integrated position/velocity rather
    // than re-deriving a shared acceleration term (the aero step isn't
    // expressed in ECI).
    let aero_r = frames::geodetic_to_eci(aero_next.lat, aero_next.lon, aero_next.alt, sim_time_secs + dt);
    let aero_v = frames::geodetic_velocity_to_eci(
        aero_next.lat, aero_next.lon, aero_next.alt, aero_next.speed, aero_next.heading, aero_next.gamma,
        sim_time_secs + dt,
    );

    let blended_pos = lerp_pos(&kepler_result.position, &aero_r, aero_blend);
    let blended_vel = lerp_vel(&kepler_result.velocity, &aero_v, aero_blend);

    state.eci_pos = blended_pos;
    state.eci_vel = blended_vel;
    state.roll = aero_next.roll;
    state.throttle = aero_next.throttle;
    state.engine_on = aero_next.engine_on;

    if aero_blend < 0.1 {
        // The ECI cache is authoritative; local state is a derived view
        // only.
        let (lat, lon, alt) = frames::eci_to_geodetic(&blended_pos, sim_time_secs + dt);
        state.lat = lat;
        state.lon = lon;
        state.alt = alt;
        state.speed = blended_vel.speed();
        state.heading = blended_vel.heading();
        let radial_hat = blended_pos.norm().max(1.0);
        let vertical_speed = blended_vel.x * blended_pos.x / radial_hat
            + blended_vel.y * blended_pos.y / radial_hat
            + blended_vel.z * blended_pos.z / radial_hat;
        state.gamma = (vertical_speed / state.speed.max(1e-6)).clamp(-1.0, 1.0).asin();
    } else {
        // Local aerodynamic state remains authoritative; the ECI cache
        // above is just a re-sync for sensors/renderer.
        state.lat = aero_next.lat;
        state.lon = aero_next.lon;
        state.alt = aero_next.alt;
        state.speed = aero_next.speed;
        state.heading = aero_next.heading;
        state.gamma = aero_next.gamma;
    }
}

fn lerp_pos(a: &arenasim_core::types::Position, b: &arenasim_core::types::Position, t: f64) -> arenasim_core::types::Position {
    arenasim_core::types::Position::new(
        a.x + (b.x - a.x) * t,
        a.y + (b.y - a.y) * t,
        a.z + (b.z - a.z) * t,
    )
}

fn lerp_vel(a: &arenasim_core::types::Velocity, b: &arenasim_core::types::Velocity, t: f64) -> arenasim_core::types::Velocity {
    arenasim_core::types::Velocity::new(
        a.x + (b.x - a.x) * t,
        a.y + (b.y - a.y) * t,
        a.z + (b.z - a.z) * t,
    )
}

/// Pure 3-DOF aerodynamic integration (no orbital blending).
fn integrate_aerodynamic(
    state: &FlightRecord,
    controls: &FlightControls,
    perf: &AircraftPerformance,
    weather: &WeatherModel,
    dt: f64,
) -> FlightRecord {
    let mut next = *state;

    let rho = atmo::density(state.alt);
    let thrust = if controls.engine_on { perf.max_thrust_n * controls.throttle } else { 0.0 };
    let drag = 0.5 * rho * state.speed * state.speed * perf.drag_coefficient * perf.reference_area_m2;
    let lift = controls.load_factor * perf.mass_kg * G0;

    let d_speed_dt = (thrust - drag) / perf.mass_kg - G0 * state.gamma.sin();
    let d_gamma_dt = if state.speed > 1.0 {
        (lift * controls.roll_rad.cos() - perf.mass_kg * G0 * state.gamma.cos()) / (perf.mass_kg * state.speed)
    } else {
        0.0
    };
    let d_heading_dt = if state.speed > 1.0 && state.gamma.cos().abs() > 1e-6 {
        lift * controls.roll_rad.sin() / (perf.mass_kg * state.speed * state.gamma.cos())
    } else {
        0.0
    };

    let wind_deltas = wind::apply_wind_to_state(&weather.wind, state.alt, state.heading, state.gamma, state.aero_blend);

    next.speed = (state.speed + (d_speed_dt) * dt + wind_deltas.d_speed * dt).max(0.0);
    next.gamma = state.gamma + d_gamma_dt * dt + wind_deltas.d_gamma * dt;
    next.heading = (state.heading + d_heading_dt * dt + wind_deltas.d_heading * dt).rem_euclid(std::f64::consts::TAU);
    next.roll = controls.roll_rad;
    next.throttle = controls.throttle;
    next.engine_on = controls.engine_on;

    let r = EARTH_RADIUS_M + state.alt;
    let d_lat_dt = state.speed * state.gamma.cos() * state.heading.cos() / r;
    let d_lon_dt = state.speed * state.gamma.cos() * state.heading.sin() / (r * state.lat.cos().max(1e-6));
    let d_alt_dt = state.speed * state.gamma.sin();

    next.lat = state.lat + d_lat_dt * dt;
    next.lon = state.lon + d_lon_dt * dt;
    next.alt = (state.alt + d_alt_dt * dt).max(-500.0);

    next
}
