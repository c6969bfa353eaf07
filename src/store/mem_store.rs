use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StateStore, StoreError};

/// Process-local store. States are lost on restart.
#[derive(Debug, Default)]
pub struct InMemStateStore {
    states: RwLock<HashMap<i64, String>>,
}

impl InMemStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for InMemStateStore {
    async fn get(&self, chat_id: i64) -> Result<Option<String>, StoreError> {
        Ok(self.states.read().await.get(&chat_id).cloned())
    }

    async fn set(&self, chat_id: i64, state: &str) -> Result<(), StoreError> {
        self.states
            .write()
            .await
            .insert(chat_id, state.to_string());
        Ok(())
    }
}
