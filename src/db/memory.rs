use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::Storage;
use crate::error::StorageError;

/// In-process store; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Value>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses every save, for exercising failure paths
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.documents.read().await.contains_key(key)
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable(format!(
                "store is read-only, cannot save '{}'",
                key
            )));
        }

        self.documents.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
