//! Registry of live interview connections, keyed by a generated connection
//! id rather than any transport object, with explicit removal on disconnect.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ActiveConnection {
    pub principal: Uuid,
    pub document_id: Uuid,
    pub opened_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionRegistry {
    connections: RwLock<HashMap<Uuid, ActiveConnection>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, principal: Uuid, document_id: Uuid) -> Uuid {
        let connection_id = Uuid::new_v4();
        let mut connections = self.connections.write().expect("registry lock poisoned");
        connections.insert(
            connection_id,
            ActiveConnection {
                principal,
                document_id,
                opened_at: Utc::now(),
            },
        );
        connection_id
    }

    pub fn deregister(&self, connection_id: Uuid) -> Option<ActiveConnection> {
        let mut connections = self.connections.write().expect("registry lock poisoned");
        connections.remove(&connection_id)
    }

    pub fn get(&self, connection_id: Uuid) -> Option<ActiveConnection> {
        let connections = self.connections.read().expect("registry lock poisoned");
        connections.get(&connection_id).cloned()
    }

    pub fn active_count(&self) -> usize {
        let connections = self.connections.read().expect("registry lock poisoned");
        connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_deregister() {
        let registry = SessionRegistry::new();
        let principal = Uuid::new_v4();
        let document_id = Uuid::new_v4();

        let conn = registry.register(principal, document_id);
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.get(conn).unwrap().principal, principal);

        let removed = registry.deregister(conn).unwrap();
        assert_eq!(removed.document_id, document_id);
        assert_eq!(registry.active_count(), 0);
        assert!(registry.deregister(conn).is_none());
    }

    #[test]
    fn test_connection_ids_are_distinct() {
        let registry = SessionRegistry::new();
        let principal = Uuid::new_v4();
        let a = registry.register(principal, Uuid::new_v4());
        let b = registry.register(principal, Uuid::new_v4());
        assert_ne!(a, b);
        assert_eq!(registry.active_count(), 2);
    }
}
