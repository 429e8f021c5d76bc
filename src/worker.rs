use std::sync::Arc;
use std::time::Duration;

use deadpool_redis::{redis::AsyncCommands, Config as RedisConfig, Connection, Pool, Runtime};
use tokio::sync::Semaphore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interview_agent::application::RetrievalService;
use interview_agent::domain::ports::{DocumentStore, EmbeddingService, VectorStore};
use interview_agent::domain::{DocumentKind, IngestionStatus};
use interview_agent::infrastructure::{
    keys, queues, Config, EmbedJdJob, JobStatusRecord, QdrantVectorStore, RedisDocumentStore,
    TextEmbedding, RESULT_TTL_SECONDS,
};

pub type RedisPool = Pool;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Redis pool error: {0}")]
    Pool(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkerError>;

pub fn create_pool(redis_url: &str) -> Result<RedisPool> {
    let cfg = RedisConfig::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| WorkerError::Pool(e.to_string()))
}

pub struct WorkerState {
    pub redis_pool: RedisPool,
    pub retrieval: Arc<RetrievalService>,
    pub documents: Arc<dyn DocumentStore>,
    pub max_attempts: u32,
}

impl WorkerState {
    pub async fn new(redis_pool: RedisPool, config: &Config) -> anyhow::Result<Self> {
        let embedding: Arc<dyn EmbeddingService> =
            Arc::new(TextEmbedding::from_config(&config.embedding));
        let vector_store: Arc<dyn VectorStore> = Arc::new(
            QdrantVectorStore::new(
                &config.vector.qdrant_url,
                config.embedding.dimension,
                config.vector.ready_checks,
                Duration::from_millis(config.vector.ready_check_interval_ms),
            )
            .await?,
        );
        let retrieval = Arc::new(RetrievalService::new(
            embedding,
            vector_store,
            config.retrieval.chunk_max_tokens,
            config.retrieval.top_k,
        ));
        let documents: Arc<dyn DocumentStore> =
            Arc::new(RedisDocumentStore::new(redis_pool.clone()));

        Ok(Self {
            redis_pool,
            retrieval,
            documents,
            max_attempts: config.worker.max_attempts,
        })
    }
}

pub struct JobConsumer {
    state: Arc<WorkerState>,
    concurrency: usize,
}

impl JobConsumer {
    pub fn new(state: WorkerState, concurrency: usize) -> Self {
        Self {
            state: Arc::new(state),
            concurrency,
        }
    }

    pub async fn start(&self) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        tracing::info!(concurrency = self.concurrency, "consumer started");

        loop {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let state = self.state.clone();

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = process_next_job(&state).await {
                    tracing::error!(error = %e, "job failed");
                }
            });

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

async fn conn(state: &WorkerState) -> Result<Connection> {
    state
        .redis_pool
        .get()
        .await
        .map_err(|e| WorkerError::Pool(e.to_string()))
}

async fn set_status(conn: &mut Connection, status: &JobStatusRecord) -> Result<()> {
    let json = serde_json::to_string(status)?;
    conn.set_ex::<_, _, ()>(keys::job_status(&status.job_id), &json, RESULT_TTL_SECONDS)
        .await
        .map_err(|e| WorkerError::Redis(e.to_string()))
}

async fn process_next_job(state: &WorkerState) -> Result<()> {
    let mut c = conn(state).await?;

    let result: Option<(String, String)> = c
        .brpop(&[queues::EMBED_JD_QUEUE], 1.0)
        .await
        .map_err(|e| WorkerError::Redis(e.to_string()))?;

    if let Some((queue, job_json)) = result {
        match queue.as_str() {
            q if q == queues::EMBED_JD_QUEUE => {
                process_embed_jd_job(state, serde_json::from_str(&job_json)?).await?;
            }
            _ => tracing::warn!(queue, "unknown queue"),
        }
    }
    Ok(())
}

async fn process_embed_jd_job(state: &WorkerState, job: EmbedJdJob) -> Result<()> {
    let attempt = job.attempts + 1;
    tracing::info!(job_id = %job.job_id, document_id = %job.document_id, attempt, "embedding job description");
    let mut c = conn(state).await?;

    set_status(&mut c, &JobStatusRecord::active(job.job_id, attempt)).await?;

    let outcome = embed_jd(state, &job).await;

    match outcome {
        Ok(()) => {
            set_status(&mut c, &JobStatusRecord::completed(job.job_id, attempt)).await?;
            tracing::info!(job_id = %job.job_id, "embed completed");
        }
        Err(e) if attempt < state.max_attempts => {
            tracing::warn!(job_id = %job.job_id, error = %e, attempt, "embed failed, requeueing");
            let retry = job.next_attempt();
            let json = serde_json::to_string(&retry)?;
            c.lpush::<_, _, ()>(queues::EMBED_JD_QUEUE, &json)
                .await
                .map_err(|e| WorkerError::Redis(e.to_string()))?;
            set_status(&mut c, &JobStatusRecord::queued(retry.job_id, attempt)).await?;
        }
        Err(e) => {
            tracing::error!(job_id = %job.job_id, error = %e, attempt, "embed failed permanently");
            set_status(
                &mut c,
                &JobStatusRecord::failed(job.job_id, attempt, e.to_string()),
            )
            .await?;
            if let Err(e) = state
                .documents
                .update_status(job.document_id, IngestionStatus::Error)
                .await
            {
                tracing::error!(job_id = %job.job_id, error = %e, "failed to mark document errored");
            }
        }
    }

    Ok(())
}

async fn embed_jd(
    state: &WorkerState,
    job: &EmbedJdJob,
) -> std::result::Result<(), interview_agent::domain::DomainError> {
    state
        .documents
        .update_status(job.document_id, IngestionStatus::Processing)
        .await?;
    state
        .retrieval
        .embed_summary(DocumentKind::JobDescription, job.document_id, &job.text)
        .await?;
    state
        .documents
        .update_status(job.document_id, IngestionStatus::Embedded)
        .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worker=debug,interview_agent=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let redis_pool = create_pool(&config.redis_url)?;
    info!("Redis connected");

    let state = WorkerState::new(redis_pool, &config).await?;
    info!("Qdrant connected");

    let concurrency = config.worker.concurrency;
    let consumer = JobConsumer::new(state, concurrency);

    info!(concurrency, "worker started");
    consumer.start().await?;

    Ok(())
}
