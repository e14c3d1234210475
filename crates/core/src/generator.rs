//! Generator trait: the abstraction over language-model backends.
//!
//! The orchestrator only ever asks for one of two things: a summary of some
//! text, or an answer to a follow-up question given prior conversation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::GenerationError;

/// What the generator is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Summary,
    Followup,
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub mode: GenerationMode,

    /// Text to summarize, or the follow-up question.
    pub text: String,

    /// Source URL for summaries, rendered history for follow-ups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl GenerationRequest {
    pub fn summary(text: impl Into<String>, source_url: Option<String>) -> Self {
        Self {
            mode: GenerationMode::Summary,
            text: text.into(),
            context: source_url,
        }
    }

    pub fn followup(question: impl Into<String>, history: impl Into<String>) -> Self {
        Self {
            mode: GenerationMode::Followup,
            text: question.into(),
            context: Some(history.into()),
        }
    }
}

/// The core Generator trait.
///
/// Prompt in, reply out. Any transport or model failure is a
/// [`GenerationError`]; callers decide whether to absorb it.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
