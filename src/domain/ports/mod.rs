mod credentials;
mod document_store;
mod embedding;
mod llm;
mod object_storage;
mod session_store;
mod vector_store;

pub use credentials::CredentialVerifier;
pub use document_store::DocumentStore;
pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use object_storage::ObjectStorage;
pub use session_store::SessionStore;
pub use vector_store::VectorStore;
