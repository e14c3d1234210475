//! Message classification: decides which pipeline handles a message.
//!
//! Rules are applied in order; the first match wins:
//!
//! 1. Starts with `http://` or `https://` (any case) → [`Intent::Url`]
//! 2. Ends with `?` → [`Intent::Followup`]
//! 3. Longer than 200 characters → [`Intent::Content`]
//! 4. Three or more `.`, `!` or `?` → [`Intent::Content`]
//! 5. Anything else → [`Intent::Followup`]

use serde::{Deserialize, Serialize};

/// Messages longer than this are treated as pasted content.
pub const CONTENT_LENGTH_THRESHOLD: usize = 200;

/// Messages with at least this many sentence terminators are treated as pasted content.
pub const SENTENCE_MARK_THRESHOLD: usize = 3;

/// The pipeline a message is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// A link to fetch and summarize.
    Url,
    /// Pasted text to summarize.
    Content,
    /// A question about the conversation so far.
    Followup,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Url => write!(f, "URL"),
            Intent::Content => write!(f, "CONTENT"),
            Intent::Followup => write!(f, "FOLLOWUP"),
        }
    }
}

/// Classify a message. Pure and total.
pub fn classify(text: &str) -> Intent {
    let trimmed = text.trim();

    if has_http_scheme(trimmed) {
        return Intent::Url;
    }
    if trimmed.ends_with('?') {
        return Intent::Followup;
    }
    if trimmed.chars().count() > CONTENT_LENGTH_THRESHOLD {
        return Intent::Content;
    }

    let marks = text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count();
    if marks >= SENTENCE_MARK_THRESHOLD {
        return Intent::Content;
    }

    Intent::Followup
}

fn has_http_scheme(text: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        text.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
