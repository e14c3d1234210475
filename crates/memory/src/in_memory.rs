//! In-memory backend: useful for testing and ephemeral deployments.

use async_trait::async_trait;
use skimmer_core::conversation::SessionLog;
use skimmer_core::error::StorageError;
use skimmer_core::storage::SessionStorage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A backend that keeps session records in a HashMap.
/// Nothing survives a restart.
pub struct InMemoryStorage {
    records: Arc<RwLock<HashMap<String, SessionLog>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionLog>, StorageError> {
        Ok(self.records.read().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, log: &SessionLog) -> Result<(), StorageError> {
        self.records
            .write()
            .await
            .insert(session_id.to_string(), log.clone());
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        let mut ids: Vec<String> = self.records.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skimmer_core::conversation::ConversationEntry;

    #[tokio::test]
    async fn save_and_load() {
        let storage = InMemoryStorage::new();
        assert!(storage.load("s1").await.unwrap().is_none());

        let now = Utc::now();
        let mut log = SessionLog::new(now);
        log.push(ConversationEntry::user("hello"), now);
        storage.save("s1", &log).await.unwrap();

        let loaded = storage.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded, log);
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let storage = InMemoryStorage::new();
        let log = SessionLog::new(Utc::now());
        storage.save("b", &log).await.unwrap();
        storage.save("a", &log).await.unwrap();
        assert_eq!(storage.list_sessions().await.unwrap(), ["a", "b"]);
    }
}
