//! Generic alerting/logging events produced by subsystems. Domain-specific
//! observable events (effects, audio) live in their owning crate
//! (`arenasim-effects`) and are combined into the top-level snapshot by
//! `arenasim-sim`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// A UI/log alert, carrying enough context to be useful in a headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub tick: u64,
}
