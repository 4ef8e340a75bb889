//! Wire types for the Monte-Carlo bridge: the job request piped to a
//! spawned engine process's stdin, the JSON-lines progress messages it
//! emits on stdout while running, and the aggregated result shapes
//! `POST /api/mc/{batch,replay,doe}` would hand back to a caller.
//!
//! Field names are camelCase to match the bridge's documented JSON
//! shapes; the `type` tag on [`OutputLine`] is snake_case, matching the
//! three literal message types it must emit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A batch run request: replicate a scenario `runs` times with
/// independent seeds derived from `seed`, to `maxTime` simulated
/// seconds at a fixed `dt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub scenario: serde_json::Value,
    pub runs: u32,
    pub seed: u64,
    pub max_time: f64,
    pub dt: f64,
}

/// A replay request: run one replication, sampling observable state
/// every `sample_interval` seconds into a trajectory log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRequest {
    pub scenario: serde_json::Value,
    pub seed: u64,
    pub max_time: f64,
    pub dt: f64,
    pub sample_interval: f64,
}

/// A design-of-experiments sweep: each entry in `permutations` is a
/// caller-defined JSON object (counts per role, SMA, inclination,
/// engagement range, weapon type, Pk, ...) merged over `arena_config`
/// and run once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoeRequest {
    pub permutations: Vec<serde_json::Value>,
    pub seed: u64,
    pub max_time: f64,
    pub arena_config: serde_json::Value,
}

/// The job request an engine process reads from stdin. Tagged so a
/// single `arenasim-cli` subcommand reads the right shape regardless of
/// which bridge endpoint queued it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum JobRequest {
    Batch(BatchRequest),
    Replay(ReplayRequest),
    Doe(DoeRequest),
}

/// One JSON-line emitted by the engine process on stdout while it
/// works, plus the final `result` line carrying the aggregated output.
/// `run_complete`/`replay_progress`/`done` are the three progress
/// message types the bridge contract requires on its side channel;
/// `result` is the one the engine-side CLI appends afterward so a
/// caller piping a single stdout stream still gets everything it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputLine {
    RunComplete { run: u32, total: u32 },
    ReplayProgress { step: u64, #[serde(rename = "totalSteps")] total_steps: u64, #[serde(rename = "simTime")] sim_time: f64 },
    Done { elapsed: f64 },
    Result { result: serde_json::Value },
}

/// Outcome of one batch replication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub run: u32,
    pub seed: u64,
    pub winner: Option<String>,
    pub survivors_blue: u32,
    pub survivors_red: u32,
    pub final_sim_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub mean_final_sim_time: f64,
    pub mean_survivors_blue: f64,
    pub mean_survivors_red: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub runs: Vec<RunOutcome>,
    pub win_rates: HashMap<String, f64>,
    pub summary: SummaryStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectorySample {
    pub step: u64,
    pub sim_time: f64,
    pub state: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayResult {
    pub trajectory: Vec<TrajectorySample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermutationResult {
    pub permutation_index: usize,
    pub params: serde_json::Value,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoeResult {
    pub total_permutations: usize,
    pub results: Vec<PermutationResult>,
}

/// Status values a queryable job can be in. `GET /api/mc/jobs/:id`
/// surfaces this alongside `progress`/`results`/`error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: String,
    pub mode: JobMode,
    pub status: JobStatus,
    pub progress: Option<serde_json::Value>,
    pub results: Option<serde_json::Value>,
    pub error: Option<String>,
    pub elapsed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    Batch,
    Replay,
    Doe,
}

impl From<&JobRequest> for JobMode {
    fn from(request: &JobRequest) -> Self {
        match request {
            JobRequest::Batch(_) => JobMode::Batch,
            JobRequest::Replay(_) => JobMode::Replay,
            JobRequest::Doe(_) => JobMode::Doe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_request_tags_on_mode_field() {
        let req = JobRequest::Batch(BatchRequest {
            scenario: serde_json::json!({}),
            runs: 10,
            seed: 1,
            max_time: 600.0,
            dt: 0.1,
        });
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["mode"], "batch");
        assert_eq!(v["runs"], 10);
    }

    #[test]
    fn output_line_round_trips_through_json() {
        let line = OutputLine::ReplayProgress { step: 5, total_steps: 100, sim_time: 12.5 };
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains(r#""type":"replay_progress""#));
        assert!(json.contains(r#""totalSteps":100"#));
        assert!(json.contains(r#""simTime":12.5"#));
        let back: OutputLine = serde_json::from_str(&json).unwrap();
        matches!(back, OutputLine::ReplayProgress { step: 5, .. });
    }

    #[test]
    fn done_message_matches_documented_shape() {
        let line = OutputLine::Done { elapsed: 4.2 };
        let v = serde_json::to_value(&line).unwrap();
        assert_eq!(v["type"], "done");
        assert_eq!(v["elapsed"], 4.2);
    }
}
