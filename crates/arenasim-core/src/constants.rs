//! Simulation-wide constants and tuning parameters.
//!
//! Grouped by the subsystem that owns them: one flat constants module
//! per crate rather than a runtime config file.

/// Default simulation tick rate (Hz). Scenarios may override sub-system
/// rates but the physics step always runs at this rate.
pub const TICK_RATE: u32 = 30;

/// Seconds per tick at the default tick rate.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Sim time is clamped to this max step to prevent integrator blow-up
/// after a pause or a slow frame.
pub const MAX_DT: f64 = 0.1;

// --- Gravitational / Earth constants ---

/// Earth gravitational parameter, m^3/s^2.
pub const MU_EARTH: f64 = 3.986_004_418e14;

/// Sun gravitational parameter, m^3/s^2.
pub const MU_SUN: f64 = 1.327_124_400_18e20;

/// Mean Earth radius, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Effective Earth radius for radar/radio propagation (4/3 model).
pub const EFFECTIVE_EARTH_RADIUS_M: f64 = EARTH_RADIUS_M * 4.0 / 3.0;

/// Earth rotation rate, rad/s, used as the GMST proxy.
pub const EARTH_ROTATION_RATE: f64 = 7.292_115_9e-5;

/// Geopotential-altitude effective radius (US-1976 atmosphere), meters.
pub const GEOPOTENTIAL_EARTH_RADIUS_M: f64 = 6_356_766.0;

/// Standard gravity at sea level, m/s^2.
pub const G0: f64 = 9.80665;

/// Universal gas constant for air, J/(kg*K).
pub const AIR_GAS_CONSTANT: f64 = 287.053;

/// Ratio of specific heats for air.
pub const AIR_GAMMA: f64 = 1.4;

/// One astronomical unit, meters.
pub const AU_M: f64 = 1.495_978_707e11;

// --- Tick scheduler rates (Hz unless noted) ---

pub const DATALINK_RATE_HZ: f64 = 1.0;
pub const COMMS_LINK_RATE_HZ: f64 = 4.0;
pub const COMMS_ROUTING_RATE_HZ: f64 = 2.0;
pub const AUTO_TRACK_PACKET_INTERVAL_SECS: f64 = 2.0;
pub const CONJUNCTION_RATE_HZ: f64 = 1.0;
pub const METRICS_WINDOW_SECS: f64 = 30.0;

// --- Conjunction thresholds (meters) ---

pub const CONJUNCTION_WATCH_M: f64 = 50_000.0;
pub const CONJUNCTION_WARNING_M: f64 = 10_000.0;
pub const CONJUNCTION_CRITICAL_M: f64 = 1_000.0;
pub const CONJUNCTION_TCA_HORIZON_SECS: f64 = 600.0;
pub const CONJUNCTION_MAX_ALERTS: usize = 50;

/// SDA maneuver-detection thresholds.
pub const SDA_DV_THRESHOLD_MPS: f64 = 5.0;
pub const SDA_DSMA_THRESHOLD_M: f64 = 10_000.0;

// --- Comms ---

pub const SPEED_OF_LIGHT_MPS: f64 = 299_792_458.0;
pub const FIBER_LATENCY_FIXED_MS: f64 = 0.5;
pub const PACKET_LOG_CAPACITY: usize = 1000;

// --- Sonar ---

pub const SONAR_CONVERGENCE_ZONE_M: f64 = 33_000.0;
pub const SONAR_CZ_WINDOW_M: f64 = 2_000.0;
