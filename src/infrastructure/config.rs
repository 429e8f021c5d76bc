use serde::Deserialize;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector: VectorConfig,
    pub retrieval: RetrievalConfig,
    pub worker: WorkerConfig,
    pub interview: InterviewConfig,
    pub redis_url: String,
    pub storage_root: String,
    /// `key:uuid` pairs for the static credential verifier; empty means the
    /// Redis-backed verifier is used instead.
    pub api_keys: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    pub qdrant_url: String,
    /// Readiness poll budget for collection creation at startup.
    pub ready_checks: u32,
    pub ready_check_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub chunk_max_tokens: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    /// Idle seconds before an unanswered question abandons the session;
    /// 0 disables the timeout and a session may wait forever.
    pub idle_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parse("SERVER_PORT", 8080),
            },
            llm: LlmConfig {
                model: env_or("LLM_MODEL", "gpt-3.5-turbo"),
            },
            embedding: EmbeddingConfig {
                model: env_or("EMBEDDING_MODEL", "text-embedding-ada-002"),
                dimension: env_parse("EMBEDDING_DIMENSION", 1536),
            },
            vector: VectorConfig {
                qdrant_url: env_or("QDRANT_URL", "http://localhost:6334"),
                ready_checks: env_parse("QDRANT_READY_CHECKS", 30),
                ready_check_interval_ms: env_parse("QDRANT_READY_CHECK_INTERVAL_MS", 2000),
            },
            retrieval: RetrievalConfig {
                chunk_max_tokens: env_parse("CHUNK_MAX_TOKENS", 200),
                top_k: env_parse("RETRIEVAL_TOP_K", 3),
            },
            worker: WorkerConfig {
                concurrency: env_parse("WORKER_CONCURRENCY", 4),
                max_attempts: env_parse("JOB_MAX_ATTEMPTS", 3),
            },
            interview: InterviewConfig {
                idle_timeout_seconds: env_parse("INTERVIEW_IDLE_TIMEOUT_SECONDS", 0),
            },
            redis_url: env_or("REDIS_URL", "redis://localhost:6379"),
            storage_root: env_or("STORAGE_ROOT", "./data/uploads"),
            api_keys: env_or("API_KEYS", ""),
        }
    }

    pub fn idle_timeout(&self) -> Option<std::time::Duration> {
        match self.interview.idle_timeout_seconds {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}
