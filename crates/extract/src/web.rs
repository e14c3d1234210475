//! HTTP page extractor.

use crate::html::html_to_text;
use async_trait::async_trait;
use skimmer_config::ExtractionConfig;
use skimmer_core::error::ExtractionError;
use skimmer_core::extractor::Extractor;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches a page over HTTP(S) and reduces it to readable text.
pub struct WebExtractor {
    client: reqwest::Client,
    timeout: Duration,
    user_agent: String,
    min_content_chars: usize,
    max_body_bytes: usize,
}

impl WebExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        Self::build(
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
            config.min_content_chars,
            config.max_body_bytes,
        )
    }

    /// Same settings with a different request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ExtractionError> {
        Self::build(
            timeout,
            &self.user_agent,
            self.min_content_chars,
            self.max_body_bytes,
        )
    }

    fn build(
        timeout: Duration,
        user_agent: &str,
        min_content_chars: usize,
        max_body_bytes: usize,
    ) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ExtractionError::Network(format!("HTTP client error: {e}")))?;

        Ok(Self {
            client,
            timeout,
            user_agent: user_agent.to_string(),
            min_content_chars,
            max_body_bytes,
        })
    }

    fn map_request_error(&self, e: reqwest::Error) -> ExtractionError {
        if e.is_timeout() {
            ExtractionError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            ExtractionError::Network(e.to_string())
        }
    }
}

/// Parse and check a URL before any I/O happens.
pub fn validate_url(url: &str) -> Result<reqwest::Url, ExtractionError> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| ExtractionError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(ExtractionError::UnsupportedScheme(other.to_string())),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ExtractionError::InvalidUrl(format!("{url}: missing host")));
    }
    Ok(parsed)
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

#[async_trait]
impl Extractor for WebExtractor {
    fn name(&self) -> &str {
        "web"
    }

    async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        let url = validate_url(url)?;
        debug!(url = %url, "Fetching page");

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::HttpStatus {
                status: status.as_u16(),
            });
        }

        // A missing content type is let through; the parser copes with
        // whatever arrives and the length floor catches non-pages.
        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !is_html(content_type) {
                return Err(ExtractionError::NotHtml {
                    content_type: content_type.to_string(),
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_request_error(e))?
        {
            let room = self.max_body_bytes - body.len();
            if chunk.len() > room {
                body.extend_from_slice(&chunk[..room]);
                warn!(url = %url, limit = self.max_body_bytes, "Page body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        let text = html_to_text(&String::from_utf8_lossy(&body));
        let chars = text.chars().count();
        if chars < self.min_content_chars {
            return Err(ExtractionError::TooShort {
                chars,
                min: self.min_content_chars,
            });
        }

        debug!(url = %url, bytes = body.len(), chars, "Page extracted");
        Ok(text)
    }
}
