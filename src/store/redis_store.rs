use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::debug;

use super::{StateStore, StoreError};

/// Redis store: key is the chat id, value the state name.
#[derive(Clone)]
pub struct RedisStateStore {
    conn: MultiplexedConnection,
}

impl RedisStateStore {
    /// Connect and check the server answers.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis state store connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn get(&self, chat_id: i64) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<Vec<u8>> = conn.get(chat_id).await?;
        // Non UTF-8 values decode to an unknown state and restart the dialogue.
        Ok(raw.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn set(&self, chat_id: i64, state: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(chat_id, state).await?;
        Ok(())
    }
}
