use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interview_agent::api::{create_router, queue, AppState};
use interview_agent::application::{
    DocumentService, DocumentTextCache, InterviewEngine, RetrievalService, SimilarityService,
};
use interview_agent::domain::ports::{
    CredentialVerifier, DocumentStore, EmbeddingService, LlmService, ObjectStorage, SessionStore,
    VectorStore,
};
use interview_agent::domain::QuestionPlan;
use interview_agent::infrastructure::{
    Config, FsObjectStorage, OpenAiLlm, QdrantVectorStore, RedisApiKeyVerifier,
    RedisDocumentStore, RedisSessionStore, StaticApiKeyVerifier, TextEmbedding,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,interview_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let redis_pool = queue::create_pool(&config.redis_url)?;
    info!("Redis pool initialized");

    let vector_store: Arc<dyn VectorStore> = Arc::new(
        QdrantVectorStore::new(
            &config.vector.qdrant_url,
            config.embedding.dimension,
            config.vector.ready_checks,
            Duration::from_millis(config.vector.ready_check_interval_ms),
        )
        .await?,
    );
    info!("Qdrant collections ready");

    let embedding: Arc<dyn EmbeddingService> =
        Arc::new(TextEmbedding::from_config(&config.embedding));
    let llm: Arc<dyn LlmService> = Arc::new(OpenAiLlm::new(&config.llm.model));
    let storage: Arc<dyn ObjectStorage> = Arc::new(FsObjectStorage::new(&config.storage_root));
    let documents: Arc<dyn DocumentStore> = Arc::new(RedisDocumentStore::new(redis_pool.clone()));
    let sessions: Arc<dyn SessionStore> = Arc::new(RedisSessionStore::new(redis_pool.clone()));

    let verifier: Arc<dyn CredentialVerifier> = {
        let static_verifier = StaticApiKeyVerifier::from_spec(&config.api_keys);
        if static_verifier.is_empty() {
            Arc::new(RedisApiKeyVerifier::new(redis_pool.clone()))
        } else {
            info!("using static API key verifier");
            Arc::new(static_verifier)
        }
    };

    let retrieval = Arc::new(RetrievalService::new(
        embedding,
        vector_store.clone(),
        config.retrieval.chunk_max_tokens,
        config.retrieval.top_k,
    ));
    let document_service = Arc::new(DocumentService::new(
        documents.clone(),
        storage.clone(),
        vector_store.clone(),
        retrieval.clone(),
    ));
    let interview = Arc::new(InterviewEngine::new(
        retrieval,
        llm.clone(),
        sessions.clone(),
        documents,
        storage,
        Arc::new(DocumentTextCache::new()),
        QuestionPlan::default(),
        config.idle_timeout(),
    ));
    let similarity = Arc::new(SimilarityService::new(vector_store, llm));

    let host = config.server.host.clone();
    let port = config.server.port;

    let state = AppState::new(
        redis_pool,
        verifier,
        document_service,
        sessions,
        interview,
        similarity,
        config,
    );
    let app = create_router(state);

    let addr = SocketAddr::new(host.parse()?, port);
    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
