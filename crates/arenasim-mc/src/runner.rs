//! Child-process orchestration: spawns `arenasim-cli` (or any binary
//! speaking the same stdin/stdout protocol) per job, feeds it the
//! request, parses its JSON-lines stdout, and drives the job record in
//! `JobStore` through running -> complete/failed. This is the bridge
//! side of the contract; `arenasim-cli` is the engine side, running the
//! whole job (including a DOE sweep's full permutation list) in one
//! process.
//!
//! Per spec: batch jobs get 300s, replay 60s, DOE 120s per permutation
//! — since one child process owns an entire DOE sweep, its budget is
//! `permutations * 120s`, documented here rather than split across many
//! short-lived children.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::time::Instant;

use crate::error::McError;
use crate::job::JobStore;
use crate::protocol::{JobMode, JobRequest, OutputLine};

pub const BATCH_TIMEOUT: Duration = Duration::from_secs(300);
pub const REPLAY_TIMEOUT: Duration = Duration::from_secs(60);
pub const DOE_PERMUTATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Points at the engine binary this process supervises. A thin wrapper
/// so call sites don't hardcode the path or the stdin/stdout contract.
#[derive(Clone)]
pub struct EngineSpawner {
    pub cli_path: PathBuf,
}

impl EngineSpawner {
    pub fn new(cli_path: impl Into<PathBuf>) -> Self {
        Self { cli_path: cli_path.into() }
    }

    /// Spawn a job for `request`, returning its id immediately. The
    /// child process and job bookkeeping run on a detached task.
    pub async fn submit(&self, store: JobStore, request: JobRequest) -> String {
        let mode = JobMode::from(&request);
        let job_id = store.create(mode).await;
        let spawner = self.clone();
        let job_id_for_task = job_id.clone();
        tokio::spawn(async move {
            spawner.drive(store, job_id_for_task, request).await;
        });
        job_id
    }

    async fn drive(&self, store: JobStore, job_id: String, request: JobRequest) {
        let start = Instant::now();
        let outcome = match &request {
            JobRequest::Batch(req) => self.run_child(&["batch"], req, BATCH_TIMEOUT, &store, &job_id).await,
            JobRequest::Replay(req) => self.run_child(&["replay"], req, REPLAY_TIMEOUT, &store, &job_id).await,
            JobRequest::Doe(req) => {
                let permutation_count = req.permutations.len().max(1) as u32;
                let timeout = DOE_PERMUTATION_TIMEOUT * permutation_count;
                self.run_child(&["doe"], req, timeout, &store, &job_id).await
            }
        };
        let elapsed = start.elapsed().as_secs_f64();
        match outcome {
            Ok(result) => store.complete(&job_id, result, elapsed).await,
            Err(error) => {
                let error = error.to_string();
                tracing::warn!(job_id, error = %error, "engine job failed");
                store.fail(&job_id, error, elapsed).await;
            }
        }
    }

    /// Spawn `cli_path <subcommand>`, write `request` to its stdin as
    /// JSON, and drain stdout lines, treating each as an [`OutputLine`].
    /// Progress lines update the job record; the `result` line is
    /// returned. A child that exceeds `timeout` is killed and its
    /// partial output discarded, per the documented cancellation policy.
    async fn run_child<T: serde::Serialize>(
        &self,
        subcommand: &[&str],
        request: &T,
        timeout: Duration,
        store: &JobStore,
        job_id: &str,
    ) -> Result<serde_json::Value, McError> {
        let body = serde_json::to_vec(request).map_err(McError::Encode)?;
        let mut child = Command::new(&self.cli_path)
            .args(subcommand)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(McError::Spawn)?;

        let mut stdin = child.stdin.take().expect("piped stdin is always present on a freshly spawned child");
        stdin.write_all(&body).await.map_err(McError::WriteRequest)?;
        drop(stdin);

        let stdout = child.stdout.take().expect("piped stdout is always present on a freshly spawned child");
        let stderr = child.stderr.take().expect("piped stderr is always present on a freshly spawned child");

        let work = async {
            let mut lines = BufReader::new(stdout).lines();
            let mut result = None;
            while let Ok(Some(line)) = lines.next_line().await {
                match serde_json::from_str::<OutputLine>(&line) {
                    Ok(OutputLine::RunComplete { run, total }) => {
                        store.update_progress(job_id, serde_json::json!({"type": "run_complete", "run": run, "total": total})).await;
                    }
                    Ok(OutputLine::ReplayProgress { step, total_steps, sim_time }) => {
                        store.update_progress(job_id, serde_json::json!({"type": "replay_progress", "step": step, "totalSteps": total_steps, "simTime": sim_time})).await;
                    }
                    Ok(OutputLine::Done { elapsed }) => {
                        store.update_progress(job_id, serde_json::json!({"type": "done", "elapsed": elapsed})).await;
                    }
                    Ok(OutputLine::Result { result: r }) => result = Some(r),
                    Err(e) => tracing::debug!(line, error = %e, "engine emitted a non-protocol stdout line"),
                }
            }
            result
        };

        let result = match tokio::time::timeout(timeout, work).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                let _ = child.kill().await;
                return Err(McError::NoResult);
            }
            Err(_) => {
                let _ = child.kill().await;
                return Err(McError::Timeout(timeout.as_secs()));
            }
        };

        let status = child.wait().await.map_err(McError::Wait)?;
        if !status.success() {
            let stderr_excerpt = read_stderr_excerpt(stderr).await;
            return Err(McError::NonZeroExit { status, stderr_excerpt });
        }

        Ok(result)
    }
}

async fn read_stderr_excerpt(stderr: tokio::process::ChildStderr) -> String {
    use tokio::io::AsyncReadExt;
    const MAX_BYTES: usize = 2000;
    let mut buf = Vec::new();
    let mut stderr = stderr;
    let _ = stderr.read_to_end(&mut buf).await;
    buf.truncate(MAX_BYTES);
    String::from_utf8_lossy(&buf).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BatchRequest, DoeRequest};
    use std::io::Write;

    /// A tiny stand-in "engine" script so `run_child` can be exercised
    /// without a real `arenasim-cli` binary. Echoes a `done` line then a
    /// `result` line derived from stdin, ignoring argv.
    fn fake_engine_script(body: &str) -> PathBuf {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("arenasim_mc_fake_engine_{}.sh", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\n{body}").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
        }
        path
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn run_child_parses_progress_and_result_lines() {
        let script = fake_engine_script(r#"cat >/dev/null; echo '{"type":"run_complete","run":1,"total":1}'; echo '{"type":"done","elapsed":0.01}'; echo '{"type":"result","result":{"ok":true}}'"#);
        let spawner = EngineSpawner::new(script);
        let store = JobStore::new();
        let req = BatchRequest { scenario: serde_json::json!({}), runs: 1, seed: 1, max_time: 1.0, dt: 0.1 };
        let result = spawner.run_child(&["batch"], &req, Duration::from_secs(5), &store, "job-test").await.unwrap();
        assert_eq!(result, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn run_child_reports_nonzero_exit_with_stderr() {
        let script = fake_engine_script("cat >/dev/null; echo 'boom' 1>&2; exit 1");
        let spawner = EngineSpawner::new(script);
        let store = JobStore::new();
        let req = BatchRequest { scenario: serde_json::json!({}), runs: 1, seed: 1, max_time: 1.0, dt: 0.1 };
        let err = spawner.run_child(&["batch"], &req, Duration::from_secs(5), &store, "job-test").await.unwrap_err();
        assert!(matches!(err, McError::NonZeroExit { .. }));
    }

    #[test]
    fn doe_timeout_scales_with_permutation_count() {
        let req = DoeRequest { permutations: vec![serde_json::json!({}); 3], seed: 0, max_time: 1.0, arena_config: serde_json::json!({}) };
        let timeout = DOE_PERMUTATION_TIMEOUT * req.permutations.len().max(1) as u32;
        assert_eq!(timeout, Duration::from_secs(360));
    }
}
