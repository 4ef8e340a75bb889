//! The job state machine: an in-memory, addressable, pollable record
//! per submitted batch/replay/DOE request. `JobStore` is the shared
//! table a (not-in-scope) HTTP handler would read from `GET
//! /api/mc/jobs/:id`; `runner` is the only writer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::protocol::{JobMode, JobRecord, JobStatus};

/// Monotonic job-id allocator. Ids are opaque strings (`job-<n>`) rather
/// than UUIDs since the bridge only needs them unique within one running
/// process, not across restarts.
#[derive(Default)]
pub struct JobIdGenerator {
    next: AtomicU64,
}

impl JobIdGenerator {
    pub fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("job-{n}")
    }
}

/// Shared, clonable handle to the job table.
#[derive(Clone, Default)]
pub struct JobStore {
    inner: Arc<Mutex<HashMap<String, JobRecord>>>,
    ids: Arc<JobIdGenerator>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, mode: JobMode) -> String {
        let job_id = self.ids.next_id();
        let record = JobRecord {
            job_id: job_id.clone(),
            mode,
            status: JobStatus::Running,
            progress: None,
            results: None,
            error: None,
            elapsed: 0.0,
        };
        self.inner.lock().await.insert(job_id.clone(), record);
        job_id
    }

    pub async fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.inner.lock().await.get(job_id).cloned()
    }

    pub async fn update_progress(&self, job_id: &str, progress: serde_json::Value) {
        if let Some(record) = self.inner.lock().await.get_mut(job_id) {
            record.progress = Some(progress);
        }
    }

    pub async fn complete(&self, job_id: &str, results: serde_json::Value, elapsed: f64) {
        if let Some(record) = self.inner.lock().await.get_mut(job_id) {
            record.status = JobStatus::Complete;
            record.results = Some(results);
            record.elapsed = elapsed;
        }
    }

    pub async fn fail(&self, job_id: &str, error: String, elapsed: f64) {
        if let Some(record) = self.inner.lock().await.get_mut(job_id) {
            record.status = JobStatus::Failed;
            record.error = Some(error);
            record.elapsed = elapsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_job_starts_running_and_progresses_to_complete() {
        let store = JobStore::new();
        let id = store.create(JobMode::Batch).await;
        let record = store.get(&id).await.unwrap();
        assert_eq!(record.status, JobStatus::Running);

        store.update_progress(&id, serde_json::json!({"run": 1, "total": 10})).await;
        store.complete(&id, serde_json::json!({"runs": []}), 1.5).await;

        let record = store.get(&id).await.unwrap();
        assert_eq!(record.status, JobStatus::Complete);
        assert_eq!(record.elapsed, 1.5);
        assert!(record.results.is_some());
    }

    #[tokio::test]
    async fn job_ids_are_unique_and_stable_per_store() {
        let store = JobStore::new();
        let a = store.create(JobMode::Replay).await;
        let b = store.create(JobMode::Replay).await;
        assert_ne!(a, b);
        assert!(store.get(&a).await.is_some());
    }

    #[tokio::test]
    async fn unknown_job_id_returns_none() {
        let store = JobStore::new();
        assert!(store.get("job-does-not-exist").await.is_none());
    }
}
