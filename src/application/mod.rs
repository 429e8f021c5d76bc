//! Application layer - use cases and orchestration.
//!
//! Services here orchestrate domain logic over the domain ports (traits)
//! rather than concrete adapters.

pub mod cache;
pub mod registry;
pub mod services;

pub use cache::DocumentTextCache;
pub use registry::SessionRegistry;
pub use services::{
    ClientChannel, ClientMessage, DocumentService, InterviewEngine, RetrievalService,
    ServerMessage, SessionOutcome, SimilarityReport, SimilarityService,
};
