//! Orbital kernel: universal-variable Kepler propagation, classical
//! element conversion, and geodetic<->ECI frame transforms.

pub mod elements;
pub mod frames;
pub mod kepler;

pub use elements::{from_state, OrbitalElements};
pub use frames::{eci_to_geodetic, geodetic_to_eci, geodetic_velocity_to_eci, gmst_proxy};
pub use kepler::{propagate, stumpff_c, stumpff_s, PropagationResult};
