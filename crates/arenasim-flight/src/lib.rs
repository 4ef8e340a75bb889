//! Atmospheric flight dynamics for airbreathing and boosting entities,
//! blended seamlessly into the vacuum orbital propagator above ~80 km.
//! Grounded on the orbital kernel's propagate/frames API plus the
//! teacher's `systems/arc_prediction.rs` pattern of replicating exact
//! per-tick physics for prediction as well as stepping.

pub mod controls;
pub mod propagator;

pub use controls::{AircraftPerformance, FlightControls};
pub use propagator::{aero_blend_for_altitude, step};
