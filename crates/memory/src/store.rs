//! Session-scoped conversation store.
//!
//! The store owns one [`SessionHandle`] per session identifier. Handles are
//! created lazily on first reference and live as long as the store.
//!
//! Each handle serializes every operation on its session behind an async
//! mutex, so reads and writes on one session are linearized while different
//! sessions never contend. Before the first operation on a session is
//! served, the handle loads the persisted record exactly once; concurrent
//! callers wait on that load instead of observing an empty log.
//!
//! Mutations are persisted before they are acknowledged. If the backend
//! write fails the in-memory log is rolled back and the caller gets a
//! [`StorageError`].

use chrono::Utc;
use skimmer_core::conversation::{ConversationEntry, SessionLog, SessionStats};
use skimmer_core::error::StorageError;
use skimmer_core::storage::SessionStorage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OnceCell, OwnedMutexGuard};
use tracing::{debug, warn};

/// Exclusive ownership of a session for the duration of one turn.
///
/// Holding the guard keeps other turns on the same session waiting, so a
/// turn's user and assistant entries land next to each other in the log.
/// Individual store operations still work while it is held.
pub struct TurnGuard {
    _guard: OwnedMutexGuard<()>,
}

struct SessionHandle {
    id: String,
    log: OnceCell<Mutex<SessionLog>>,
    turn: Arc<Mutex<()>>,
}

impl SessionHandle {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            log: OnceCell::new(),
            turn: Arc::new(Mutex::new(())),
        }
    }

    /// Lock the session's log, loading it from storage on first use.
    ///
    /// A failed load leaves the cell empty, so the next caller retries.
    async fn lock(
        &self,
        storage: &dyn SessionStorage,
    ) -> Result<MutexGuard<'_, SessionLog>, StorageError> {
        let cell = self
            .log
            .get_or_try_init(|| async {
                let log = match storage.load(&self.id).await? {
                    Some(log) => {
                        debug!(session_id = %self.id, entries = log.len(), "Session loaded");
                        log
                    }
                    None => {
                        debug!(session_id = %self.id, "Session materialized");
                        SessionLog::new(Utc::now())
                    }
                };
                Ok::<_, StorageError>(Mutex::new(log))
            })
            .await?;
        Ok(cell.lock().await)
    }
}

/// Durable, per-session ordered log of conversation entries.
pub struct ConversationStore {
    storage: Arc<dyn SessionStorage>,
    sessions: std::sync::Mutex<HashMap<String, Arc<SessionHandle>>>,
}

impl ConversationStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            sessions: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// The name of the backing storage.
    pub fn backend(&self) -> &str {
        self.storage.name()
    }

    fn handle(&self, session_id: &str) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(SessionHandle::new(session_id)))
            .clone()
    }

    /// Reserve the session for a whole turn. See [`TurnGuard`].
    pub async fn begin_turn(&self, session_id: &str) -> TurnGuard {
        let handle = self.handle(session_id);
        TurnGuard {
            _guard: handle.turn.clone().lock_owned().await,
        }
    }

    /// Append an entry and persist the session. Returns the committed entry count.
    ///
    /// The entry's `created_at` is assigned here. On error nothing was recorded.
    pub async fn append(
        &self,
        session_id: &str,
        entry: ConversationEntry,
    ) -> Result<usize, StorageError> {
        let handle = self.handle(session_id);
        let mut log = handle.lock(self.storage.as_ref()).await?;

        let previous_access = log.last_accessed_at;
        let count = log.push(entry, Utc::now());

        if let Err(e) = self.storage.save(session_id, &log).await {
            log.entries.pop();
            log.last_accessed_at = previous_access;
            return Err(e);
        }

        debug!(session_id, entries = count, "Entry appended");
        Ok(count)
    }

    /// The last `limit` entries, oldest first. Touches `last_accessed_at`.
    pub async fn recent(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationEntry>, StorageError> {
        let handle = self.handle(session_id);
        let mut log = handle.lock(self.storage.as_ref()).await?;
        self.touch(session_id, &mut log).await;
        Ok(log.recent(limit))
    }

    /// The whole log, oldest first. Touches `last_accessed_at`.
    pub async fn history(&self, session_id: &str) -> Result<Vec<ConversationEntry>, StorageError> {
        self.recent(session_id, usize::MAX).await
    }

    /// Truncate the log to empty. `created_at` is preserved.
    ///
    /// Waits for any in-flight turn on the session, so a turn's pair is
    /// either cleared together or kept together. Must not be called while
    /// holding a [`TurnGuard`] for the same session.
    pub async fn clear(&self, session_id: &str) -> Result<(), StorageError> {
        let _turn = self.begin_turn(session_id).await;
        let handle = self.handle(session_id);
        let mut log = handle.lock(self.storage.as_ref()).await?;

        let previous_entries = log.entries.clone();
        let previous_access = log.last_accessed_at;
        log.clear(Utc::now());

        if let Err(e) = self.storage.save(session_id, &log).await {
            log.entries = previous_entries;
            log.last_accessed_at = previous_access;
            return Err(e);
        }

        debug!(session_id, "Session cleared");
        Ok(())
    }

    /// Entry count and timestamps. Pure read: does not touch `last_accessed_at`.
    pub async fn stats(&self, session_id: &str) -> Result<SessionStats, StorageError> {
        let handle = self.handle(session_id);
        let log = handle.lock(self.storage.as_ref()).await?;
        Ok(log.stats())
    }

    /// Identifiers of every persisted session.
    pub async fn sessions(&self) -> Result<Vec<String>, StorageError> {
        self.storage.list_sessions().await
    }

    /// Record a read. Persisting the new timestamp is best-effort: a failed
    /// write is logged and the read still succeeds.
    async fn touch(&self, session_id: &str, log: &mut SessionLog) {
        log.touch(Utc::now());
        if let Err(e) = self.storage.save(session_id, log).await {
            warn!(session_id, error = %e, "Failed to persist session access time");
        }
    }
}
