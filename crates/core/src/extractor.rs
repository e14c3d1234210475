//! Extractor trait: turns a URL into plain text.

use async_trait::async_trait;
use crate::error::ExtractionError;

/// Fetches a page and returns its readable text.
///
/// Implementations must bound their own network time and surface a timeout as
/// [`ExtractionError::Timeout`] rather than hanging the turn.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, url: &str) -> Result<String, ExtractionError>;
}
