mod document;
mod embedding;
mod session;
mod vector;

pub use document::{Document, DocumentKind, IngestionStatus};
pub use embedding::Embedding;
pub use session::{
    extract_score, InterviewSession, PlanStep, QuestionPlan, QuestionRecord, SessionStatus,
};
pub use vector::{chunk_vector_id, VectorMatch, VectorMetadata, VectorNamespace, VectorRecord};
