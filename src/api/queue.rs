use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use uuid::Uuid;

use crate::infrastructure::{
    keys, queues, EmbedJdJob, JobStatusRecord, RESULT_TTL_SECONDS,
};

pub type RedisPool = Pool;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis pool error: {0}")]
    Pool(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QueueError>;

pub fn create_pool(redis_url: &str) -> Result<RedisPool> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| QueueError::Pool(e.to_string()))
}

#[derive(Clone)]
pub struct JobProducer {
    pool: RedisPool,
}

impl JobProducer {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| QueueError::Pool(e.to_string()))
    }

    pub async fn push_embed_job(&self, job: &EmbedJdJob) -> Result<Uuid> {
        let mut conn = self.conn().await?;
        let payload = serde_json::to_string(job)?;

        conn.lpush::<_, _, ()>(queues::EMBED_JD_QUEUE, payload)
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        let status = serde_json::to_string(&JobStatusRecord::queued(job.job_id, job.attempts))?;
        conn.set_ex::<_, _, ()>(keys::job_status(&job.job_id), &status, RESULT_TTL_SECONDS)
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        tracing::info!(job_id = %job.job_id, document_id = %job.document_id, "embed job queued");
        Ok(job.job_id)
    }

    pub async fn get_job_status(&self, job_id: &Uuid) -> Result<Option<JobStatusRecord>> {
        let mut conn = self.conn().await?;
        let result: Option<String> = conn
            .get(keys::job_status(job_id))
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        result
            .map(|json| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }
}
