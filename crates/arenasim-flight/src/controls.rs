//! Pilot/autopilot control inputs consumed by the propagator each tick.
//! AI and weapon-guidance systems outside this crate set these; the
//! propagator only integrates them.

/// Aircraft performance constants, one set per aircraft type.
#[derive(Debug, Clone, Copy)]
pub struct AircraftPerformance {
    pub mass_kg: f64,
    pub max_thrust_n: f64,
    pub drag_coefficient: f64,
    pub reference_area_m2: f64,
}

impl Default for AircraftPerformance {
    fn default() -> Self {
        Self { mass_kg: 9_000.0, max_thrust_n: 90_000.0, drag_coefficient: 0.03, reference_area_m2: 38.0 }
    }
}

/// Control inputs for one tick. `load_factor` is the commanded ratio of
/// lift to weight (1.0 = unaccelerated level flight, >1.0 pulls up),
/// combined with `roll_rad` to produce a coordinated turn (the
/// `L*cos(roll)` / `L*sin(roll)` terms in the gamma/heading rates).
#[derive(Debug, Clone, Copy)]
pub struct FlightControls {
    pub throttle: f64,
    pub roll_rad: f64,
    pub load_factor: f64,
    pub engine_on: bool,
}

impl Default for FlightControls {
    fn default() -> Self {
        Self { throttle: 0.5, roll_rad: 0.0, load_factor: 1.0, engine_on: true }
    }
}
