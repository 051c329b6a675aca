//! Coaching jobs: asynchronous, cancellable coaching generation.
//!
//! Starting a job returns immediately with a `job_id`; callers poll status
//! and may cancel while it is pending. Jobs live in memory only and finished
//! jobs are pruned an hour after they finish.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::coaching::generator::{generate_coaching, CoachingModel, GenerationError};
use crate::coaching::synthesizer::CoachingRequest;

/// How long a finished job stays queryable.
const JOB_RETENTION_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Succeeded { coaching_text: String },
    Failed { error: String },
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachingJob {
    pub job_id: Uuid,
    pub emp_id: String,
    pub manager_id: String,
    #[serde(flatten)]
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

struct JobEntry {
    job: CoachingJob,
    abort: Option<AbortHandle>,
}

/// Registry of coaching jobs, shared through `AppState`.
#[derive(Clone, Default)]
pub struct CoachingJobs {
    inner: Arc<Mutex<HashMap<Uuid, JobEntry>>>,
}

impl CoachingJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a generation task and returns its pending job.
    pub async fn start(
        &self,
        model: Arc<dyn CoachingModel>,
        request: CoachingRequest,
        timeout: Duration,
        emp_id: &str,
        manager_id: &str,
    ) -> CoachingJob {
        let job = CoachingJob {
            job_id: Uuid::new_v4(),
            emp_id: emp_id.to_string(),
            manager_id: manager_id.to_string(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            finished_at: None,
        };

        // Held across spawn so the task cannot finish before its entry exists.
        let mut jobs = self.inner.lock().await;
        prune_finished(&mut jobs);

        let registry = self.clone();
        let job_id = job.job_id;
        let handle = tokio::spawn(async move {
            let result = generate_coaching(model.as_ref(), &request, timeout).await;
            registry.finish(job_id, result).await;
        });

        jobs.insert(
            job_id,
            JobEntry {
                job: job.clone(),
                abort: Some(handle.abort_handle()),
            },
        );
        info!("Started coaching job {job_id} for employee {emp_id} (manager {manager_id})");
        job
    }

    pub async fn get(&self, job_id: Uuid) -> Option<CoachingJob> {
        self.inner.lock().await.get(&job_id).map(|e| e.job.clone())
    }

    /// Aborts a pending job. Finished jobs are returned unchanged.
    pub async fn cancel(&self, job_id: Uuid) -> Option<CoachingJob> {
        let mut jobs = self.inner.lock().await;
        let entry = jobs.get_mut(&job_id)?;
        if entry.job.status == JobStatus::Pending {
            if let Some(abort) = entry.abort.take() {
                abort.abort();
            }
            entry.job.status = JobStatus::Cancelled;
            entry.job.finished_at = Some(Utc::now());
            info!("Cancelled coaching job {job_id}");
        }
        Some(entry.job.clone())
    }

    async fn finish(&self, job_id: Uuid, result: Result<String, GenerationError>) {
        let mut jobs = self.inner.lock().await;
        let Some(entry) = jobs.get_mut(&job_id) else {
            return;
        };
        if entry.job.status != JobStatus::Pending {
            return;
        }
        entry.job.status = match result {
            Ok(coaching_text) => JobStatus::Succeeded { coaching_text },
            Err(e) => {
                warn!("Coaching job {job_id} failed: {e}");
                JobStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        entry.job.finished_at = Some(Utc::now());
        entry.abort = None;
    }
}

fn prune_finished(jobs: &mut HashMap<Uuid, JobEntry>) {
    let retention = chrono::Duration::minutes(JOB_RETENTION_MINUTES);
    let now = Utc::now();
    jobs.retain(|_, e| match e.job.finished_at {
        Some(done) => now - done < retention,
        None => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coaching::generator::tests::StubModel;

    fn request() -> CoachingRequest {
        CoachingRequest {
            profile_block: "직급: 대리".to_string(),
            history_block: String::new(),
        }
    }

    async fn wait_until_done(jobs: &CoachingJobs, job_id: Uuid) -> CoachingJob {
        for _ in 0..200 {
            let job = jobs.get(job_id).await.unwrap();
            if job.status != JobStatus::Pending {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {job_id} never finished");
    }

    #[tokio::test]
    async fn test_job_succeeds_with_model_text() {
        let jobs = CoachingJobs::new();
        let job = jobs
            .start(
                Arc::new(StubModel::replying("가이드")),
                request(),
                Duration::from_secs(5),
                "E1",
                "1",
            )
            .await;
        assert_eq!(job.status, JobStatus::Pending);

        let done = wait_until_done(&jobs, job.job_id).await;
        assert_eq!(
            done.status,
            JobStatus::Succeeded {
                coaching_text: "가이드".to_string()
            }
        );
        assert!(done.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_job_failure_is_recorded() {
        let jobs = CoachingJobs::new();
        let job = jobs
            .start(
                Arc::new(StubModel::failing()),
                request(),
                Duration::from_secs(5),
                "E1",
                "1",
            )
            .await;

        let done = wait_until_done(&jobs, job.job_id).await;
        assert!(matches!(done.status, JobStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_pending_job_can_be_cancelled() {
        let jobs = CoachingJobs::new();
        let job = jobs
            .start(
                Arc::new(StubModel::slow(Duration::from_secs(600))),
                request(),
                Duration::from_secs(900),
                "E1",
                "1",
            )
            .await;

        let cancelled = jobs.cancel(job.job_id).await.unwrap();
        assert_eq!(cancelled.status, JobStatus::Cancelled);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            jobs.get(job.job_id).await.unwrap().status,
            JobStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_cancel_after_finish_is_noop() {
        let jobs = CoachingJobs::new();
        let job = jobs
            .start(
                Arc::new(StubModel::replying("done")),
                request(),
                Duration::from_secs(5),
                "E1",
                "1",
            )
            .await;
        wait_until_done(&jobs, job.job_id).await;

        let after = jobs.cancel(job.job_id).await.unwrap();
        assert!(matches!(after.status, JobStatus::Succeeded { .. }));
    }

    #[tokio::test]
    async fn test_unknown_job_is_none() {
        let jobs = CoachingJobs::new();
        assert!(jobs.get(Uuid::new_v4()).await.is_none());
        assert!(jobs.cancel(Uuid::new_v4()).await.is_none());
    }

    #[test]
    fn test_job_serializes_status_inline() {
        let job = CoachingJob {
            job_id: Uuid::nil(),
            emp_id: "E1".into(),
            manager_id: "1".into(),
            status: JobStatus::Failed {
                error: "timeout".into(),
            },
            created_at: Utc::now(),
            finished_at: None,
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "timeout");
    }
}
