//! Conversation memory for Skimmer.
//!
//! [`ConversationStore`] is the session-scoped log the agent reads and
//! writes. It persists through a pluggable [`SessionStorage`] backend:
//! JSON files, SQLite, or process memory.

pub mod file_backend;
pub mod in_memory;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file_backend::FileStorage;
pub use in_memory::InMemoryStorage;
pub use store::{ConversationStore, TurnGuard};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

use skimmer_config::StorageConfig;
use skimmer_core::error::StorageError;
use skimmer_core::storage::SessionStorage;
use std::sync::Arc;
use tracing::info;

/// Open the storage backend named in the config.
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn SessionStorage>, StorageError> {
    let storage: Arc<dyn SessionStorage> = match config.backend.as_str() {
        "memory" => Arc::new(InMemoryStorage::new()),
        "file" => Arc::new(FileStorage::new(config.resolved_path())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.resolved_path();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StorageError::Unavailable(format!(
                        "Failed to create {}: {e}",
                        parent.display()
                    ))
                })?;
            }
            Arc::new(SqliteStorage::new(&path.to_string_lossy()).await?)
        }
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => {
            return Err(StorageError::Unavailable(
                "SQLite support was not compiled in (enable the `sqlite` feature)".into(),
            ));
        }
        other => {
            return Err(StorageError::Unavailable(format!(
                "Unknown storage backend '{other}'. Use file, sqlite or memory."
            )));
        }
    };

    info!(backend = storage.name(), "Session storage ready");
    Ok(storage)
}
