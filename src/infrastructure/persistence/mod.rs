mod in_memory;
mod redis;

pub use in_memory::{InMemoryDocumentStore, InMemorySessionStore};
pub use redis::{RedisDocumentStore, RedisSessionStore};
