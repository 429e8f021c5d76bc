use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Dimension mismatch: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::AuthFailure(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
