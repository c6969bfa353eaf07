//! # Conversation State Store
//!
//! Maps a chat id to the name of the conversation state it is in. One read
//! and one write per update, last write wins, no expiry.

mod mem_store;
mod pg_store;
mod redis_store;

pub use mem_store::InMemStateStore;
pub use pg_store::PgStateStore;
pub use redis_store::RedisStateStore;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

use crate::config::StateStoreConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Key-value persistence for conversation state names.
///
/// Values are raw strings so that stale or corrupted entries can be read
/// back and decoded by the caller.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, chat_id: i64) -> Result<Option<String>, StoreError>;

    async fn set(&self, chat_id: i64, state: &str) -> Result<(), StoreError>;
}

/// Open the store selected by the configuration.
pub async fn connect(config: &StateStoreConfig) -> Result<Arc<dyn StateStore>, StoreError> {
    match config {
        StateStoreConfig::InMemory => {
            info!("Using in-memory conversation state store");
            Ok(Arc::new(InMemStateStore::new()))
        }
        StateStoreConfig::Redis(url) => {
            info!("Connecting to Redis conversation state store");
            Ok(Arc::new(RedisStateStore::connect(url.expose_secret()).await?))
        }
        StateStoreConfig::Postgres(url) => {
            info!("Connecting to Postgres conversation state store");
            Ok(Arc::new(PgStateStore::connect(url.expose_secret()).await?))
        }
    }
}
