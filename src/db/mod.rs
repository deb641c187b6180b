pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key holding the full match collection
pub const MATCHES_KEY: &str = "matches";

/// Key holding the reusable player panels
pub const PANELS_KEY: &str = "playerPanels";

/// Key holding the last panel chosen for each team slot
pub const LAST_SELECTED_PANELS_KEY: &str = "lastSelectedPanels";

/// Key/value persistence used by the tracker.
///
/// Values are whole JSON documents; the tracker always saves a complete
/// collection under a key, never a partial update.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load the value stored under `key`, `None` when nothing was saved yet
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the value stored under `key`
    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError>;
}
