//! File-based session storage: one JSON record per session.
//!
//! Session ids are opaque caller-supplied strings, so they never become file
//! names directly. Short ids are hex-encoded (`<dir>/<hex(id)>.json`); ids
//! longer than [`MAX_HEX_ID_BYTES`] would overflow the file-name limit and
//! are stored as `<dir>/sha256-<digest>.json` instead. Every record carries
//! its `sessionId` so digest-named sessions can still be listed.
//!
//! Writes go to a sibling temp file, are fsynced, and are then renamed over
//! the record, so a crash mid-write never leaves a half-written record behind.
//!
//! Storage location: `~/.skimmer/sessions/`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skimmer_core::conversation::SessionLog;
use skimmer_core::error::StorageError;
use skimmer_core::storage::SessionStorage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const RECORD_EXT: &str = "json";
const DIGEST_PREFIX: &str = "sha256-";

/// Longest id stored under its hex name. Twice this, plus the temp-file
/// suffix, stays well under the common 255-byte file-name limit.
pub const MAX_HEX_ID_BYTES: usize = 100;

/// On-disk record: the session log plus the id it belongs to.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<'a> {
    session_id: &'a str,
    #[serde(flatten)]
    log: &'a SessionLog,
}

/// Just the id of a record, for listing digest-named files.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordId {
    session_id: Option<String>,
}

/// A directory of JSON session records.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(dir = %dir.display(), "File session storage opened");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, session_id: &str) -> PathBuf {
        let bytes = session_id.as_bytes();
        let stem = if bytes.len() <= MAX_HEX_ID_BYTES {
            hex::encode(bytes)
        } else {
            format!("{DIGEST_PREFIX}{}", hex::encode(Sha256::digest(bytes)))
        };
        self.dir.join(format!("{stem}.{RECORD_EXT}"))
    }

    /// Recover a session id from a record file name or, for digest-named
    /// records, from the record itself.
    async fn session_id_for(path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != RECORD_EXT {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.starts_with(DIGEST_PREFIX) {
            let content = tokio::fs::read(path).await.ok()?;
            return serde_json::from_slice::<RecordId>(&content).ok()?.session_id;
        }
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionLog>, StorageError> {
        let path = self.record_path(session_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Read {
                    session_id: session_id.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        // A corrupt record is surfaced, not replaced: the next save would
        // otherwise silently overwrite the session's history.
        let log = serde_json::from_str::<SessionLog>(&content).map_err(|e| {
            StorageError::Corrupt {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Some(log))
    }

    async fn save(&self, session_id: &str, log: &SessionLog) -> Result<(), StorageError> {
        let write_err = |reason: String| StorageError::Write {
            session_id: session_id.to_string(),
            reason,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_err(format!("Failed to create session directory: {e}")))?;

        let record = StoredRecord { session_id, log };
        let content = serde_json::to_vec(&record)
            .map_err(|e| write_err(format!("Failed to serialize session: {e}")))?;

        let path = self.record_path(session_id);
        let tmp = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| write_err(format!("Failed to create session file: {e}")))?;
        file.write_all(&content)
            .await
            .map_err(|e| write_err(format!("Failed to write session file: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| write_err(format!("Failed to sync session file: {e}")))?;
        drop(file);
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| write_err(format!("Failed to commit session file: {e}")))?;

        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Unavailable(e.to_string())),
        };

        let mut ids = Vec::new();
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
        {
            match Self::session_id_for(&item.path()).await {
                Some(id) => ids.push(id),
                None => warn!(path = %item.path().display(), "Skipping unrecognized file in session directory"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skimmer_core::conversation::{ConversationEntry, EntryKind};

    fn sample_log() -> SessionLog {
        let now = Utc::now();
        let mut log = SessionLog::new(now);
        log.push(
            ConversationEntry::user("https://example.com")
                .with_kind(EntryKind::UrlSummary)
                .with_source_url("https://example.com"),
            now,
        );
        log.push(
            ConversationEntry::assistant("A short summary.").with_kind(EntryKind::UrlSummary),
            now,
        );
        log
    }

    #[tokio::test]
    async fn save_and_reload_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("sessions"));
        let log = sample_log();
        storage.save("session-1", &log).await.unwrap();

        // A fresh backend over the same directory sees the record.
        let reopened = FileStorage::new(tmp.path().join("sessions"));
        let loaded = reopened.load("session-1").await.unwrap().unwrap();
        assert_eq!(loaded, log);
    }

    #[tokio::test]
    async fn missing_session_loads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        assert!(storage.load("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn opaque_ids_are_safe_file_names() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        let weird = "../../etc/passwd ünïcode/?*";
        storage.save(weird, &sample_log()).await.unwrap();

        assert!(storage.load(weird).await.unwrap().is_some());
        assert_eq!(storage.list_sessions().await.unwrap(), [weird]);
        // Nothing escaped the storage directory.
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        std::fs::write(storage.record_path("broken"), "this is not json").unwrap();

        let err = storage.load("broken").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn list_skips_foreign_files() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        storage.save("a", &sample_log()).await.unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "hi").unwrap();
        std::fs::write(tmp.path().join("zz-not-hex.json"), "{}").unwrap();

        assert_eq!(storage.list_sessions().await.unwrap(), ["a"]);
    }

    #[tokio::test]
    async fn list_on_missing_directory_is_empty() {
        let storage = FileStorage::new("/tmp/skimmer_test_nonexistent_sessions_dir");
        assert!(storage.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn long_ids_use_digest_names() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        let long_id = "t".repeat(200);
        let log = sample_log();
        storage.save(&long_id, &log).await.unwrap();
        storage.save("short", &sample_log()).await.unwrap();

        let name = storage.record_path(&long_id);
        let name = name.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(DIGEST_PREFIX));
        assert!(name.len() < 100);

        let reopened = FileStorage::new(tmp.path());
        assert_eq!(reopened.load(&long_id).await.unwrap().unwrap(), log);
        assert_eq!(reopened.list_sessions().await.unwrap(), [long_id.clone(), "short".to_string()]);
    }

    #[tokio::test]
    async fn record_carries_session_id() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        storage.save("abc", &sample_log()).await.unwrap();

        let raw = std::fs::read_to_string(storage.record_path("abc")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["sessionId"], "abc");
        assert_eq!(value["entries"].as_array().unwrap().len(), 2);
        assert!(!storage.record_path("abc").with_extension("json.tmp").exists());
    }
}
