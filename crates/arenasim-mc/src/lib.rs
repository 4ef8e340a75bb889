//! Monte-Carlo/replay/DOE bridge: the job contract, job state machine,
//! and child-process orchestration an (out-of-scope) HTTP layer would
//! sit in front of. `arenasim-cli` is the engine process this crate
//! spawns and speaks the stdin/stdout protocol with.

pub mod error;
pub mod job;
pub mod protocol;
pub mod runner;

pub use error::{McError, McResult};
pub use job::{JobIdGenerator, JobStore};
pub use protocol::{
    BatchRequest, BatchResult, DoeRequest, DoeResult, JobMode, JobRecord, JobRequest, JobStatus,
    OutputLine, PermutationResult, ReplayRequest, ReplayResult, RunOutcome, SummaryStats,
    TrajectorySample,
};
pub use runner::{EngineSpawner, BATCH_TIMEOUT, DOE_PERMUTATION_TIMEOUT, REPLAY_TIMEOUT};
