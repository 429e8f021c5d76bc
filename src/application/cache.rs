//! Process-wide document text cache with single-flight ingestion.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use uuid::Uuid;

use crate::domain::errors::DomainError;

type Entry = Arc<OnceCell<Arc<str>>>;

/// Caches fetched-and-ingested document text for the lifetime of the
/// process. Entries are never invalidated; operators restart to clear.
///
/// Concurrent callers for the same document coalesce onto one in-flight
/// fetch+ingest. A failed initialization leaves the cell empty, so a later
/// connection retries from scratch.
#[derive(Default)]
pub struct DocumentTextCache {
    entries: Mutex<HashMap<Uuid, Entry>>,
}

impl DocumentTextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_ingest<F, Fut>(
        &self,
        document_id: Uuid,
        init: F,
    ) -> Result<Arc<str>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, DomainError>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(document_id).or_default().clone()
        };

        cell.get_or_try_init(|| async { init().await.map(Arc::from) })
            .await
            .cloned()
    }

    /// Whether the document's text (and therefore its chunk ingestion) has
    /// already succeeded in this process.
    pub async fn is_ingested(&self, document_id: Uuid) -> bool {
        let entries = self.entries.lock().await;
        entries
            .get(&document_id)
            .is_some_and(|cell| cell.initialized())
    }
}
