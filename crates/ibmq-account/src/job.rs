//! Remote job lifecycle.
//!
//! ```text
//!   run() ──→ Queued ──→ Running ──→ Completed
//!               │           │
//!               │           ├──→ Failed(reason)
//!               │           │
//!               └───────────┴──→ Cancelled
//! ```
//!
//! Terminal states (`Completed`, `Failed`, `Cancelled`) are permanent, and
//! `result()` is only valid once the job is `Completed`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::api::{JobInfo, ProviderApi};
use crate::error::{AccountError, AccountResult};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job is waiting in queue.
    Queued,
    /// Job is currently running.
    Running,
    /// Job completed successfully.
    Completed,
    /// Job failed with an error message.
    Failed(String),
    /// Job was cancelled.
    Cancelled,
}

impl JobStatus {
    /// Map a service job record to a status.
    ///
    /// Unknown service states are treated as running.
    pub fn from_info(info: &JobInfo) -> Self {
        let raw = info.status.to_uppercase();
        match raw.as_str() {
            "INITIALIZING" | "QUEUED" => JobStatus::Queued,
            "VALIDATING" | "RUNNING" => JobStatus::Running,
            "COMPLETED" | "DONE" => JobStatus::Completed,
            "CANCELLED" => JobStatus::Cancelled,
            s if s == "FAILED" || s.starts_with("ERROR") => JobStatus::Failed(
                info.error.clone().unwrap_or_else(|| info.status.clone()),
            ),
            _ => JobStatus::Running,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job is still pending (queued or running).
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A job submitted to a remote backend.
#[derive(Clone)]
pub struct RemoteJob {
    id: JobId,
    backend: String,
    created_at: Option<DateTime<Utc>>,
    api: Arc<dyn ProviderApi>,
}

impl std::fmt::Debug for RemoteJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteJob")
            .field("id", &self.id)
            .field("backend", &self.backend)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl RemoteJob {
    pub(crate) fn new(info: JobInfo, backend: &str, api: Arc<dyn ProviderApi>) -> Self {
        Self {
            id: JobId::new(info.id),
            backend: info.backend.unwrap_or_else(|| backend.to_string()),
            created_at: info.creation_date,
            api,
        }
    }

    /// Job ID.
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Name of the backend the job runs on.
    pub fn backend_name(&self) -> &str {
        &self.backend
    }

    /// Creation time reported by the service.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Current status.
    pub async fn status(&self) -> AccountResult<JobStatus> {
        let info = self.api.job_status(&self.id.0).await?;
        Ok(JobStatus::from_info(&info))
    }

    /// Result document. Fails unless the job has completed.
    pub async fn result(&self) -> AccountResult<serde_json::Value> {
        match self.status().await? {
            JobStatus::Completed => Ok(self.api.job_result(&self.id.0).await?),
            JobStatus::Failed(msg) => Err(AccountError::JobFailed(msg)),
            JobStatus::Cancelled => Err(AccountError::JobCancelled(self.id.0.clone())),
            JobStatus::Queued | JobStatus::Running => {
                Err(AccountError::JobNotCompleted(self.id.0.clone()))
            }
        }
    }

    /// Poll until the job reaches a terminal state, then fetch the result.
    ///
    /// The last poll happens at the deadline. A `timeout` too large to
    /// represent as an instant waits without limit.
    pub async fn wait_for_result(
        &self,
        poll_interval: Duration,
        timeout: Duration,
    ) -> AccountResult<serde_json::Value> {
        let deadline = Instant::now().checked_add(timeout);

        loop {
            let status = self.status().await?;
            debug!("job {} on {}: {}", self.id, self.backend, status);

            match status {
                JobStatus::Completed => return Ok(self.api.job_result(&self.id.0).await?),
                JobStatus::Failed(msg) => return Err(AccountError::JobFailed(msg)),
                JobStatus::Cancelled => {
                    return Err(AccountError::JobCancelled(self.id.0.clone()));
                }
                JobStatus::Queued | JobStatus::Running => {
                    let pause = match deadline {
                        Some(deadline) => {
                            let remaining = deadline.saturating_duration_since(Instant::now());
                            if remaining.is_zero() {
                                return Err(AccountError::JobTimeout(self.id.0.clone()));
                            }
                            poll_interval.min(remaining)
                        }
                        None => poll_interval,
                    };
                    tokio::time::sleep(pause).await;
                }
            }
        }
    }

    /// Request cancellation.
    pub async fn cancel(&self) -> AccountResult<()> {
        self.api.cancel_job(&self.id.0).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(status: &str, error: Option<&str>) -> JobInfo {
        JobInfo {
            id: "job-1".into(),
            status: status.into(),
            backend: None,
            creation_date: None,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed("error".into()).is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::Running.is_pending());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(JobStatus::from_info(&info("QUEUED", None)), JobStatus::Queued);
        assert_eq!(
            JobStatus::from_info(&info("VALIDATING", None)),
            JobStatus::Running
        );
        assert_eq!(
            JobStatus::from_info(&info("completed", None)),
            JobStatus::Completed
        );
        assert_eq!(
            JobStatus::from_info(&info("CANCELLED", None)),
            JobStatus::Cancelled
        );
        assert_eq!(
            JobStatus::from_info(&info("SOMETHING_NEW", None)),
            JobStatus::Running
        );
    }

    #[test]
    fn test_error_status_carries_reason() {
        assert_eq!(
            JobStatus::from_info(&info("ERROR_RUNNING_JOB", Some("bad qobj"))),
            JobStatus::Failed("bad qobj".into())
        );
        assert_eq!(
            JobStatus::from_info(&info("ERROR_VALIDATING_JOB", None)),
            JobStatus::Failed("ERROR_VALIDATING_JOB".into())
        );
    }
}
