use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Connection, Pool};
use uuid::Uuid;

use crate::domain::{
    ports::{DocumentStore, SessionStore},
    Document, DomainError, IngestionStatus, InterviewSession, SessionStatus,
};

mod keys {
    use uuid::Uuid;

    pub fn document(id: &Uuid) -> String {
        format!("document:{id}")
    }

    pub fn documents_by_owner(owner: &Uuid) -> String {
        format!("documents:owner:{owner}")
    }

    pub fn session(id: &Uuid) -> String {
        format!("interview:{id}")
    }

    pub fn sessions_by_owner(owner: &Uuid) -> String {
        format!("interviews:owner:{owner}")
    }
}

async fn conn(pool: &Pool) -> Result<Connection, DomainError> {
    pool.get()
        .await
        .map_err(|e| DomainError::internal(format!("redis pool: {e}")))
}

/// Document records as JSON values keyed by id, with a per-owner id set for
/// listing.
pub struct RedisDocumentStore {
    pool: Pool,
}

impl RedisDocumentStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn load(&self, c: &mut Connection, id: Uuid) -> Result<Option<Document>, DomainError> {
        let json: Option<String> = c
            .get(keys::document(&id))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        json.map(|j| serde_json::from_str(&j).map_err(|e| DomainError::internal(e.to_string())))
            .transpose()
    }
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn save(&self, document: &Document) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        let json =
            serde_json::to_string(document).map_err(|e| DomainError::internal(e.to_string()))?;

        c.set::<_, _, ()>(keys::document(&document.id), json)
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        c.sadd::<_, _, ()>(
            keys::documents_by_owner(&document.owner),
            document.id.to_string(),
        )
        .await
        .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        let mut c = conn(&self.pool).await?;
        self.load(&mut c, id).await
    }

    async fn find_by_filename(
        &self,
        owner: Uuid,
        filename: &str,
    ) -> Result<Option<Document>, DomainError> {
        Ok(self
            .list_by_owner(owner)
            .await?
            .into_iter()
            .find(|d| d.filename == filename))
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Document>, DomainError> {
        let mut c = conn(&self.pool).await?;
        let ids: Vec<String> = c
            .smembers(keys::documents_by_owner(&owner))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            let id: Uuid = id
                .parse()
                .map_err(|_| DomainError::internal("corrupt document id in owner set"))?;
            if let Some(document) = self.load(&mut c, id).await? {
                documents.push(document);
            }
        }
        documents.sort_by_key(|d| d.uploaded_at);
        Ok(documents)
    }

    async fn update_status(&self, id: Uuid, status: IngestionStatus) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        let mut document = self
            .load(&mut c, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

        if document.advance_status(status) {
            let json = serde_json::to_string(&document)
                .map_err(|e| DomainError::internal(e.to_string()))?;
            c.set::<_, _, ()>(keys::document(&id), json)
                .await
                .map_err(|e| DomainError::internal(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        if let Some(document) = self.load(&mut c, id).await? {
            c.srem::<_, _, ()>(
                keys::documents_by_owner(&document.owner),
                id.to_string(),
            )
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        }
        c.del::<_, ()>(keys::document(&id))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(())
    }
}

/// Whole-session JSON snapshots keyed by session id; idempotent overwrite
/// per step under the single-writer-per-session assumption.
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn load(
        &self,
        c: &mut Connection,
        id: Uuid,
    ) -> Result<Option<InterviewSession>, DomainError> {
        let json: Option<String> = c
            .get(keys::session(&id))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        json.map(|j| serde_json::from_str(&j).map_err(|e| DomainError::internal(e.to_string())))
            .transpose()
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, session: &InterviewSession) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        let json =
            serde_json::to_string(session).map_err(|e| DomainError::internal(e.to_string()))?;

        c.set::<_, _, ()>(keys::session(&session.id), json)
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        c.sadd::<_, _, ()>(
            keys::sessions_by_owner(&session.owner),
            session.id.to_string(),
        )
        .await
        .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<InterviewSession>, DomainError> {
        let mut c = conn(&self.pool).await?;
        self.load(&mut c, id).await
    }

    async fn list_completed_by_owner(
        &self,
        owner: Uuid,
    ) -> Result<Vec<InterviewSession>, DomainError> {
        let mut c = conn(&self.pool).await?;
        let ids: Vec<String> = c
            .smembers(keys::sessions_by_owner(&owner))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut sessions = Vec::new();
        for id in ids {
            let id: Uuid = id
                .parse()
                .map_err(|_| DomainError::internal("corrupt session id in owner set"))?;
            if let Some(session) = self.load(&mut c, id).await? {
                if session.status == SessionStatus::Completed {
                    sessions.push(session);
                }
            }
        }
        sessions.sort_by_key(|s| s.started_at);
        Ok(sessions)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        if let Some(session) = self.load(&mut c, id).await? {
            c.srem::<_, _, ()>(keys::sessions_by_owner(&session.owner), id.to_string())
                .await
                .map_err(|e| DomainError::internal(e.to_string()))?;
        }
        c.del::<_, ()>(keys::session(&id))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(())
    }
}
