//! Bridge-side failure modes. Distinct from `arenasim_core::SimError`,
//! which covers failures inside a running simulation; these cover
//! failures supervising the child process that runs one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McError {
    #[error("failed to spawn engine process: {0}")]
    Spawn(std::io::Error),
    #[error("failed to write job request to engine stdin: {0}")]
    WriteRequest(std::io::Error),
    #[error("engine process exceeded its {0}s timeout")]
    Timeout(u64),
    #[error("engine process exited without a result line")]
    NoResult,
    #[error("engine process exited with {status}: {stderr_excerpt}")]
    NonZeroExit { status: std::process::ExitStatus, stderr_excerpt: String },
    #[error("failed to encode job request: {0}")]
    Encode(serde_json::Error),
    #[error("permutation {index} produced a malformed batch result: {source}")]
    MalformedPermutationResult { index: usize, source: serde_json::Error },
    #[error("permutation {index} produced no run outcome")]
    EmptyPermutationResult { index: usize },
    #[error("failed waiting on engine process: {0}")]
    Wait(std::io::Error),
}

pub type McResult<T> = Result<T, McError>;
