pub mod document;
pub mod interview;
pub mod retrieval;
pub mod similarity;

pub use document::DocumentService;
pub use interview::{
    ClientChannel, ClientMessage, InterviewEngine, ServerMessage, SessionOutcome,
};
pub use retrieval::RetrievalService;
pub use similarity::{SimilarityReport, SimilarityService};
