//! Conversation entries and the per-session log.
//!
//! These are the value objects that flow through the whole system:
//! a message arrives → the orchestrator builds a user/assistant entry pair →
//! the store appends both to the session's [`SessionLog`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of an entry's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
    /// System notices
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
            Role::System => write!(f, "System"),
        }
    }
}

/// Which pipeline produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    UrlSummary,
    RawSummary,
    Followup,
    Question,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::UrlSummary => write!(f, "url-summary"),
            EntryKind::RawSummary => write!(f, "raw-summary"),
            EntryKind::Followup => write!(f, "followup"),
            EntryKind::Question => write!(f, "question"),
        }
    }
}

/// A single entry in a session's conversation log.
///
/// Entries are immutable once appended. `created_at` is always assigned by
/// the store at append time; whatever the caller put there is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    pub role: Role,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,

    /// Only ever set on `UrlSummary` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl ConversationEntry {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            kind: None,
            source_url: None,
            created_at: Utc::now(),
        }
    }

    /// Create a new user entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant entry.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system entry.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Tag the entry with the pipeline that produced it.
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Attach the source URL. Ignored unless the entry is a URL summary.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        if self.kind == Some(EntryKind::UrlSummary) {
            self.source_url = Some(url.into());
        }
        self
    }

    /// Compare everything except the server-assigned timestamp.
    pub fn same_content(&self, other: &ConversationEntry) -> bool {
        self.role == other.role
            && self.content == other.content
            && self.kind == other.kind
            && self.source_url == other.source_url
    }
}

/// The per-session aggregate, persisted as a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    /// Append-only, insertion order = conversation order.
    pub entries: Vec<ConversationEntry>,

    /// Set once, when the session is first materialized.
    pub created_at: DateTime<Utc>,

    /// Updated on every read or write.
    pub last_accessed_at: DateTime<Utc>,
}

impl SessionLog {
    /// Create an empty log materialized at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            entries: Vec::new(),
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Append an entry, stamping `created_at` so timestamps never go backwards.
    ///
    /// Returns the new entry count.
    pub fn push(&mut self, mut entry: ConversationEntry, now: DateTime<Utc>) -> usize {
        let floor = self.entries.last().map(|e| e.created_at);
        entry.created_at = match floor {
            Some(last) if last > now => last,
            _ => now,
        };
        self.entries.push(entry);
        self.touch(now);
        self.entries.len()
    }

    /// The last `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ConversationEntry> {
        let start = self.entries.len().saturating_sub(limit);
        self.entries[start..].to_vec()
    }

    /// Drop every entry, keeping `created_at`.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.entries.clear();
        self.touch(now);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_accessed_at {
            self.last_accessed_at = now;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            count: self.entries.len(),
            created_at: self.created_at,
            last_accessed_at: self.last_accessed_at,
        }
    }
}

/// Summary counters for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub count: usize,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn create_user_entry() {
        let entry = ConversationEntry::user("Hello!");
        assert_eq!(entry.role, Role::User);
        assert_eq!(entry.content, "Hello!");
        assert!(entry.kind.is_none());
    }

    #[test]
    fn source_url_only_sticks_to_url_summaries() {
        let url = ConversationEntry::user("https://example.com")
            .with_kind(EntryKind::UrlSummary)
            .with_source_url("https://example.com");
        assert_eq!(url.source_url.as_deref(), Some("https://example.com"));

        let raw = ConversationEntry::user("some text")
            .with_kind(EntryKind::RawSummary)
            .with_source_url("https://example.com");
        assert!(raw.source_url.is_none());
    }

    #[test]
    fn push_keeps_timestamps_monotonic() {
        let start = Utc::now();
        let mut log = SessionLog::new(start);
        log.push(ConversationEntry::user("first"), start + Duration::seconds(10));
        // Clock went backwards; the second entry must not precede the first.
        log.push(ConversationEntry::assistant("second"), start);
        assert!(log.entries[1].created_at >= log.entries[0].created_at);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let now = Utc::now();
        let mut log = SessionLog::new(now);
        for i in 0..7 {
            log.push(ConversationEntry::user(format!("m{i}")), now);
        }
        let tail = log.recent(3);
        let contents: Vec<_> = tail.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, ["m4", "m5", "m6"]);
        assert_eq!(log.recent(100).len(), 7);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn clear_preserves_created_at() {
        let created = Utc::now();
        let mut log = SessionLog::new(created);
        log.push(ConversationEntry::user("x"), created);
        log.clear(created + Duration::seconds(5));
        assert!(log.is_empty());
        assert_eq!(log.created_at, created);
        assert!(log.last_accessed_at > created);
    }

    #[test]
    fn record_uses_camel_case_layout() {
        let now = Utc::now();
        let mut log = SessionLog::new(now);
        log.push(
            ConversationEntry::user("https://example.com")
                .with_kind(EntryKind::UrlSummary)
                .with_source_url("https://example.com"),
            now,
        );
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastAccessedAt").is_some());
        assert_eq!(json["entries"][0]["kind"], "url-summary");
        assert_eq!(json["entries"][0]["sourceUrl"], "https://example.com");
        assert_eq!(json["entries"][0]["role"], "user");
    }

    #[test]
    fn entry_kind_display_matches_wire_name() {
        for kind in [
            EntryKind::UrlSummary,
            EntryKind::RawSummary,
            EntryKind::Followup,
            EntryKind::Question,
        ] {
            let wire = serde_json::to_string(&kind).unwrap();
            assert_eq!(wire, format!("\"{kind}\""));
        }
    }
}
