//! Maneuver planning: Lambert, Hohmann, inclination change, plane match,
//! NMC, Lagrange-point transfer, and planetary patched-conic transfer.

pub mod common;
pub mod hohmann;
pub mod inclination;
pub mod lagrange;
pub mod lambert;
pub mod nmc;
pub mod plane_match;
pub mod planetary;

pub use common::ManeuverResult;
