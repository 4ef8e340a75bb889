//! Error types for fallible boundary operations.
//!
//!, numerical non-convergence and degenerate orbits are
//! NOT represented as `Err` — they are valid output values (`valid: false`,
//! degenerate element records) so a tick can never be aborted by a solver.
//! `SimError` covers the boundary failures that genuinely must propagate:
//! scenario parsing and bridge child-process failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario parse failed: {0}")]
    ScenarioParse(String),

    #[error("unknown entity id: {0}")]
    UnknownEntity(String),

    #[error("unknown network id: {0}")]
    UnknownNetwork(String),

    #[error("child engine process failed: {0}")]
    ChildProcess(String),

    #[error("job not found: {0}")]
    JobNotFound(String),
}

pub type SimResult<T> = Result<T, SimError>;
