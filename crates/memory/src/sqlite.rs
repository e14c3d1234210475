//! SQLite session storage.
//!
//! A single table keyed by session id. The full record is stored as JSON in
//! `record`; `created_at` / `last_accessed_at` are mirrored into their own
//! columns so sessions can be listed and inspected with plain SQL.

use async_trait::async_trait;
use skimmer_core::conversation::SessionLog;
use skimmer_core::error::StorageError;
use skimmer_core::storage::SessionStorage;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite-backed session store.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) the database at `path`.
    ///
    /// Accepts a file path or a full `sqlite:` URL.
    pub async fn new(path: &str) -> Result<Self, StorageError> {
        let options = if path.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(path)
                .map_err(|e| StorageError::Unavailable(format!("Invalid SQLite URL: {e}")))?
        } else {
            SqliteConnectOptions::new().filename(path)
        };

        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let storage = Self { pool };
        storage.run_migrations().await?;
        info!("SQLite session storage initialized at {path}");
        Ok(storage)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let storage = Self { pool };
        storage.run_migrations().await?;
        Ok(storage)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id               TEXT PRIMARY KEY NOT NULL,
                record           TEXT NOT NULL,
                created_at       TEXT NOT NULL,
                last_accessed_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Unavailable(format!("sessions table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionLog>, StorageError> {
        let row = sqlx::query("SELECT record FROM sessions WHERE id = ?1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Read {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let record: String = row.try_get("record").map_err(|e| StorageError::Read {
            session_id: session_id.to_string(),
            reason: format!("record column: {e}"),
        })?;

        serde_json::from_str(&record)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(&self, session_id: &str, log: &SessionLog) -> Result<(), StorageError> {
        let record = serde_json::to_string(log).map_err(|e| StorageError::Write {
            session_id: session_id.to_string(),
            reason: format!("Failed to serialize session: {e}"),
        })?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, record, created_at, last_accessed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                record = excluded.record,
                last_accessed_at = excluded.last_accessed_at
            "#,
        )
        .bind(session_id)
        .bind(&record)
        .bind(log.created_at.to_rfc3339())
        .bind(log.last_accessed_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Write {
            session_id: session_id.to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT id FROM sessions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Unavailable(format!("list sessions: {e}")))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("id")
                    .map_err(|e| StorageError::Unavailable(format!("id column: {e}")))
            })
            .collect()
    }
}
