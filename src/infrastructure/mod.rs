pub mod auth;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod persistence;
pub mod queue;
pub mod storage;
pub mod vector_store;

pub use auth::{RedisApiKeyVerifier, StaticApiKeyVerifier};
pub use config::Config;
pub use embedding::TextEmbedding;
pub use llm::OpenAiLlm;
pub use persistence::{
    InMemoryDocumentStore, InMemorySessionStore, RedisDocumentStore, RedisSessionStore,
};
pub use queue::{keys, queues, EmbedJdJob, JobStatusRecord, QueueJobStatus, RESULT_TTL_SECONDS};
pub use storage::{FsObjectStorage, InMemoryObjectStorage};
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
