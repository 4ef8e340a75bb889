//! Communications engine: link graph construction, RF/fiber/laser link
//! budgets, jammers, cyber attacks, Dijkstra routing, priority-aware
//! packet forwarding, tactical datalink distribution, and metrics.
//! `CommEngine` in `engine` is the single explicitly-owned subsystem
//! that owns every network, link, packet, jammer, and cyber attack.

pub mod cyber;
pub mod datalink;
pub mod engine;
pub mod graph;
pub mod jammer;
pub mod link_budget;
pub mod los;
pub mod metrics;
pub mod packet;
pub mod routing;

pub use engine::{default_rf_params, CommEngine, CommEngineConfig, Link, LinkConfig, Network};
