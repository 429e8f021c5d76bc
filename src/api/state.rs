use std::sync::Arc;

use crate::api::queue::{JobProducer, RedisPool};
use crate::application::{
    DocumentService, InterviewEngine, SessionRegistry, SimilarityService,
};
use crate::domain::ports::{CredentialVerifier, SessionStore};
use crate::infrastructure::Config;

#[derive(Clone)]
pub struct AppState {
    pub redis_pool: RedisPool,
    pub job_producer: JobProducer,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub documents: Arc<DocumentService>,
    pub sessions: Arc<dyn SessionStore>,
    pub interview: Arc<InterviewEngine>,
    pub similarity: Arc<SimilarityService>,
    pub registry: Arc<SessionRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        redis_pool: RedisPool,
        verifier: Arc<dyn CredentialVerifier>,
        documents: Arc<DocumentService>,
        sessions: Arc<dyn SessionStore>,
        interview: Arc<InterviewEngine>,
        similarity: Arc<SimilarityService>,
        config: Config,
    ) -> Self {
        let job_producer = JobProducer::new(redis_pool.clone());
        Self {
            redis_pool,
            job_producer,
            verifier,
            documents,
            sessions,
            interview,
            similarity,
            registry: Arc::new(SessionRegistry::new()),
            config: Arc::new(config),
        }
    }
}
