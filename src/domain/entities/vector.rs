use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::Embedding;

/// Logical partition within the vector index. Chunk vectors and
/// whole-document summary vectors never share a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorNamespace {
    Chunks,
    Summaries,
}

impl VectorNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chunks => "document-chunks",
            Self::Summaries => "document-summaries",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub document_id: Uuid,
    pub text: String,
    pub chunk_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Embedding,
    pub metadata: VectorMetadata,
}

impl VectorRecord {
    pub fn chunk(document_id: Uuid, chunk_index: usize, text: String, vector: Embedding) -> Self {
        Self {
            id: chunk_vector_id(document_id, chunk_index),
            vector,
            metadata: VectorMetadata {
                document_id,
                text,
                chunk_index: Some(chunk_index),
            },
        }
    }

    pub fn summary(id: String, document_id: Uuid, text: String, vector: Embedding) -> Self {
        Self {
            id,
            vector,
            metadata: VectorMetadata {
                document_id,
                text,
                chunk_index: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: VectorMetadata,
}

pub fn chunk_vector_id(document_id: Uuid, chunk_index: usize) -> String {
    format!("{document_id}-chunk-{chunk_index}")
}
