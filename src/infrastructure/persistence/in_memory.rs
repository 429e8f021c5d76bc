use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    ports::{DocumentStore, SessionStore},
    Document, DomainError, IngestionStatus, InterviewSession, SessionStatus,
};

pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, document: &Document) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(documents.get(&id).cloned())
    }

    async fn find_by_filename(
        &self,
        owner: Uuid,
        filename: &str,
    ) -> Result<Option<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(documents
            .values()
            .find(|d| d.owner == owner && d.filename == filename)
            .cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let mut owned: Vec<Document> = documents
            .values()
            .filter(|d| d.owner == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|d| d.uploaded_at);
        Ok(owned)
    }

    async fn update_status(&self, id: Uuid, status: IngestionStatus) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let document = documents
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;
        document.advance_status(status);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        documents.remove(&id);
        Ok(())
    }
}

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, InterviewSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Every stored session regardless of status, for assertions.
    pub async fn all(&self) -> Vec<InterviewSession> {
        let sessions = self.sessions.read().expect("store lock poisoned");
        sessions.values().cloned().collect()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: &InterviewSession) -> Result<(), DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<InterviewSession>, DomainError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(sessions.get(&id).cloned())
    }

    async fn list_completed_by_owner(
        &self,
        owner: Uuid,
    ) -> Result<Vec<InterviewSession>, DomainError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let mut completed: Vec<InterviewSession> = sessions
            .values()
            .filter(|s| s.owner == owner && s.status == SessionStatus::Completed)
            .cloned()
            .collect();
        completed.sort_by_key(|s| s.started_at);
        Ok(completed)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        sessions.remove(&id);
        Ok(())
    }
}
