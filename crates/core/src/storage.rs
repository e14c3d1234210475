//! Storage trait: durable persistence of session logs.
//!
//! A backend stores one record per session identifier, containing the whole
//! [`SessionLog`]. Every mutation is a read-modify-write of that record;
//! serialization of concurrent access is the store's job, not the backend's.

use async_trait::async_trait;
use crate::conversation::SessionLog;
use crate::error::StorageError;

/// The core SessionStorage trait.
///
/// Implementations: JSON files, SQLite, in-memory (for testing).
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// The backend name (e.g., "file", "sqlite", "memory").
    fn name(&self) -> &str;

    /// Load the record for a session, or `None` if it was never persisted.
    async fn load(&self, session_id: &str) -> Result<Option<SessionLog>, StorageError>;

    /// Durably replace the record for a session.
    ///
    /// Must not return `Ok` until the write is committed.
    async fn save(&self, session_id: &str, log: &SessionLog) -> Result<(), StorageError>;

    /// List the identifiers of every persisted session.
    async fn list_sessions(&self) -> Result<Vec<String>, StorageError>;
}
