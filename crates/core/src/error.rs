//! Error types for the Skimmer domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum; only
//! [`ValidationError`] and [`StorageError`] ever escape a turn.

use thiserror::Error;

/// The top-level error type for all Skimmer operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Inbound validation ---
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    // --- Durable storage ---
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    // --- Text extraction ---
    #[error("Extraction failure: {0}")]
    Extraction(#[from] ExtractionError),

    // --- Generation ---
    #[error("Generation failure: {0}")]
    Generation(#[from] GenerationError),
}

impl Error {
    /// Whether the error was caused by the caller (4xx) rather than the service (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

// --- Boundary errors ---

/// Inbound message rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("sessionId is required")]
    MissingSessionId,

    #[error("message is required")]
    MissingMessage,

    #[error("message is too long ({len} characters, maximum is {max})")]
    MessageTooLong { len: usize, max: usize },
}

/// The durable read or write did not complete.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Failed to read session {session_id}: {reason}")]
    Read { session_id: String, reason: String },

    #[error("Failed to write session {session_id}: {reason}")]
    Write { session_id: String, reason: String },

    #[error("Stored record for session {session_id} is corrupt: {reason}")]
    Corrupt { session_id: String, reason: String },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Fetching or normalizing a page failed.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Only http and https URLs are supported (got '{0}')")]
    UnsupportedScheme(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("The page returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("The URL does not point to an HTML page (content type '{content_type}')")]
    NotHtml { content_type: String },

    #[error("The page did not respond within {secs}s")]
    Timeout { secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not extract enough text from the page ({chars} characters, need at least {min})")]
    TooShort { chars: usize, min: usize },
}

/// The language-model call failed.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("Generator not configured: {0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_displays_correctly() {
        let err = Error::Generation(GenerationError::Api {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn extraction_too_short_mentions_floor() {
        let err = ExtractionError::TooShort { chars: 30, min: 50 };
        let text = err.to_string();
        assert!(text.contains("30"));
        assert!(text.contains("50"));
    }

    #[test]
    fn only_validation_is_client_error() {
        assert!(Error::from(ValidationError::MissingMessage).is_client_error());
        assert!(!Error::from(StorageError::Unavailable("down".into())).is_client_error());
    }
}
