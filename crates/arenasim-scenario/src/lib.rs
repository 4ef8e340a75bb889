//! Scenario JSON parsing and scripted-event scheduling. This crate
//! produces typed, validated data; spawning entities and dispatching
//! events into a running simulation is `arenasim-sim`'s job.

pub mod loader;
pub mod scheduler;
pub mod schema;

pub use loader::load;
pub use scheduler::EventScheduler;
pub use schema::{
    AiRanges, CameraSpec, ComponentSpec, EntitySpec, Environment, Metadata, ScenarioFile,
    ScheduledEvent,
};
