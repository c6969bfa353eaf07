use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use super::{StateStore, StoreError};

/// Postgres store backed by a single `conversation_states` table.
#[derive(Clone)]
pub struct PgStateStore {
    pool: PgPool,
}

impl PgStateStore {
    /// Connect and make sure the table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::from_pool(pool);
        store.init_schema().await?;
        Ok(store)
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        info!("Initializing conversation state schema...");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS conversation_states (
                chat_id BIGINT PRIMARY KEY,
                state TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl StateStore for PgStateStore {
    async fn get(&self, chat_id: i64) -> Result<Option<String>, StoreError> {
        let state = sqlx::query_scalar::<_, String>(
            "SELECT state FROM conversation_states WHERE chat_id = $1",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(state)
    }

    async fn set(&self, chat_id: i64, state: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO conversation_states (chat_id, state) VALUES ($1, $2)
             ON CONFLICT (chat_id) DO UPDATE SET state = EXCLUDED.state, updated_at = NOW()",
        )
        .bind(chat_id)
        .bind(state)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
