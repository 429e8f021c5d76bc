use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const RESULT_TTL_SECONDS: u64 = 3600;

pub mod queues {
    pub const EMBED_JD_QUEUE: &str = "jobs:embed-jd";
}

pub mod keys {
    use uuid::Uuid;

    pub fn job_status(job_id: &Uuid) -> String {
        format!("job:status:{job_id}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueJobStatus {
    Queued,
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusRecord {
    pub job_id: Uuid,
    pub status: QueueJobStatus,
    pub attempts: u32,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl JobStatusRecord {
    fn new(job_id: Uuid, status: QueueJobStatus, attempts: u32) -> Self {
        Self {
            job_id,
            status,
            attempts,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn queued(job_id: Uuid, attempts: u32) -> Self {
        Self::new(job_id, QueueJobStatus::Queued, attempts)
    }

    pub fn active(job_id: Uuid, attempts: u32) -> Self {
        Self::new(job_id, QueueJobStatus::Active, attempts)
    }

    pub fn completed(job_id: Uuid, attempts: u32) -> Self {
        Self::new(job_id, QueueJobStatus::Completed, attempts)
    }

    pub fn failed(job_id: Uuid, attempts: u32, error: impl Into<String>) -> Self {
        let mut record = Self::new(job_id, QueueJobStatus::Failed, attempts);
        record.error = Some(error.into());
        record
    }
}

/// Asynchronous whole-document embedding of an uploaded job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedJdJob {
    pub job_id: Uuid,
    pub document_id: Uuid,
    pub text: String,
    /// Delivery count so far; bumped on every retry re-enqueue.
    pub attempts: u32,
}

impl EmbedJdJob {
    pub fn new(document_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            document_id,
            text: text.into(),
            attempts: 0,
        }
    }

    pub fn next_attempt(mut self) -> Self {
        self.attempts += 1;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_value(QueueJobStatus::Queued).unwrap();
        assert_eq!(json, serde_json::json!("queued"));
    }

    #[test]
    fn test_retry_bumps_attempts() {
        let job = EmbedJdJob::new(Uuid::new_v4(), "text");
        assert_eq!(job.attempts, 0);
        let retried = job.next_attempt();
        assert_eq!(retried.attempts, 1);
    }
}
