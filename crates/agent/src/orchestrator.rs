//! The turn orchestrator: one inbound message in, one reply out.
//!
//! Every accepted message produces exactly one user entry and one assistant
//! entry, appended in that order while the session's turn gate is held.
//! Extraction and generation failures are absorbed into an apology reply;
//! only validation and storage errors reach the caller.

use crate::classifier::{Intent, classify};
use crate::context_window::ContextWindowBuilder;
use serde::{Deserialize, Serialize};
use skimmer_config::AppConfig;
use skimmer_core::conversation::{ConversationEntry, EntryKind};
use skimmer_core::error::{Error, ExtractionError, StorageError, ValidationError};
use skimmer_core::extractor::Extractor;
use skimmer_core::generator::{GenerationRequest, Generator};
use skimmer_memory::ConversationStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Appended to summary input that had to be cut.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Reply to a follow-up when the session has nothing to refer back to.
pub const NO_CONTEXT_REPLY: &str = "I don't have any previous conversation to refer to yet. \
Send me a URL or some text to summarize first.";

/// An inbound chat message. Fields are optional so that absent values are
/// reported as validation errors rather than parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl InboundMessage {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            message: Some(message.into()),
        }
    }
}

/// The outcome of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub session_id: String,
    pub intent: Intent,
    /// Always equal to the content of the assistant entry just stored.
    pub reply: String,
    /// Session log length after the turn.
    pub entries: usize,
}

/// Tunables for a turn.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    /// Entries fetched as candidate context for a follow-up.
    pub followup_history: usize,
    /// Summary input is cut to this many characters.
    pub summary_input_chars: usize,
    /// Inbound messages longer than this are rejected.
    pub max_message_chars: usize,
    /// Extracted pages shorter than this count as failed extractions.
    pub min_content_chars: usize,
    pub context: ContextWindowBuilder,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            followup_history: 10,
            summary_input_chars: 3000,
            max_message_chars: 100_000,
            min_content_chars: 50,
            context: ContextWindowBuilder::default(),
        }
    }
}

impl ConversationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            followup_history: config.conversation.followup_history,
            summary_input_chars: config.conversation.summary_input_chars,
            max_message_chars: config.conversation.max_message_chars,
            min_content_chars: config.extraction.min_content_chars,
            context: ContextWindowBuilder::from_config(&config.conversation),
        }
    }
}

/// Routes a message to its pipeline and records the resulting turn.
pub struct TurnOrchestrator {
    store: Arc<ConversationStore>,
    extractor: Arc<dyn Extractor>,
    generator: Arc<dyn Generator>,
    settings: ConversationSettings,
}

impl TurnOrchestrator {
    pub fn new(
        store: Arc<ConversationStore>,
        extractor: Arc<dyn Extractor>,
        generator: Arc<dyn Generator>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            store,
            extractor,
            generator,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    /// Process one inbound message.
    ///
    /// Returns [`Error::Validation`] without touching any session, or
    /// [`Error::Storage`] if the turn could not be recorded.
    pub async fn handle(&self, message: InboundMessage) -> Result<TurnReply, Error> {
        let (session_id, text) = self.validate(message)?;
        let intent = classify(&text);
        info!(session_id = %session_id, intent = %intent, "Processing message");

        let _turn = self.store.begin_turn(&session_id).await;

        let outcome = match intent {
            Intent::Url => self.url_turn(&session_id, &text).await,
            Intent::Content => self.content_turn(&session_id, &text).await,
            Intent::Followup => self.followup_turn(&session_id, &text).await,
        };

        let (reply, entries) = outcome.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to record turn");
            Error::Storage(e)
        })?;

        debug!(session_id = %session_id, entries, "Turn recorded");
        Ok(TurnReply {
            session_id,
            intent,
            reply,
            entries,
        })
    }

    fn validate(&self, message: InboundMessage) -> Result<(String, String), ValidationError> {
        let session_id = message
            .session_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::MissingSessionId)?;

        let text = message
            .message
            .filter(|text| !text.trim().is_empty())
            .ok_or(ValidationError::MissingMessage)?;

        let len = text.chars().count();
        if len > self.settings.max_message_chars {
            return Err(ValidationError::MessageTooLong {
                len,
                max: self.settings.max_message_chars,
            });
        }

        Ok((session_id, text))
    }

    async fn url_turn(&self, session_id: &str, text: &str) -> Result<(String, usize), StorageError> {
        let url = text.trim();
        self.store
            .append(
                session_id,
                ConversationEntry::user(url)
                    .with_kind(EntryKind::UrlSummary)
                    .with_source_url(url),
            )
            .await?;

        let assistant = match self.summarize_url(url).await {
            Ok(summary) => ConversationEntry::assistant(summary)
                .with_kind(EntryKind::UrlSummary)
                .with_source_url(url),
            Err(e) => {
                warn!(session_id, url, error = %e, "URL summary failed");
                ConversationEntry::assistant(format!(
                    "Sorry, I couldn't summarize that URL: {}",
                    failure_message(&e)
                ))
            }
        };

        self.finish(session_id, assistant).await
    }

    async fn content_turn(&self, session_id: &str, text: &str) -> Result<(String, usize), StorageError> {
        self.store
            .append(
                session_id,
                ConversationEntry::user(text).with_kind(EntryKind::RawSummary),
            )
            .await?;

        let request = GenerationRequest::summary(self.bound_input(text.trim()), None);
        let assistant = match self.generator.generate(request).await {
            Ok(summary) => ConversationEntry::assistant(summary).with_kind(EntryKind::RawSummary),
            Err(e) => {
                warn!(session_id, error = %e, "Text summary failed");
                ConversationEntry::assistant(format!("Sorry, I couldn't summarize that text: {e}"))
            }
        };

        self.finish(session_id, assistant).await
    }

    async fn followup_turn(&self, session_id: &str, text: &str) -> Result<(String, usize), StorageError> {
        // Read before appending so the question is not part of its own context.
        let history = self
            .store
            .recent(session_id, self.settings.followup_history)
            .await?;

        self.store
            .append(
                session_id,
                ConversationEntry::user(text).with_kind(EntryKind::Followup),
            )
            .await?;

        let assistant = match self.settings.context.build(&history, text.trim()) {
            None => {
                debug!(session_id, "No prior conversation, skipping generation");
                ConversationEntry::assistant(NO_CONTEXT_REPLY)
            }
            Some(request) => match self.generator.generate(request).await {
                Ok(answer) => ConversationEntry::assistant(answer).with_kind(EntryKind::Followup),
                Err(e) => {
                    warn!(session_id, error = %e, "Follow-up answer failed");
                    ConversationEntry::assistant(format!(
                        "Sorry, I couldn't answer that question: {e}"
                    ))
                }
            },
        };

        self.finish(session_id, assistant).await
    }

    async fn finish(
        &self,
        session_id: &str,
        assistant: ConversationEntry,
    ) -> Result<(String, usize), StorageError> {
        let reply = assistant.content.clone();
        let entries = self.store.append(session_id, assistant).await?;
        Ok((reply, entries))
    }

    /// Extract, check the length floor, and summarize.
    async fn summarize_url(&self, url: &str) -> Result<String, Error> {
        let text = self.extractor.extract(url).await?;
        let text = text.trim();

        let chars = text.chars().count();
        if chars < self.settings.min_content_chars {
            return Err(ExtractionError::TooShort {
                chars,
                min: self.settings.min_content_chars,
            }
            .into());
        }

        let request = GenerationRequest::summary(self.bound_input(text), Some(url.to_string()));
        Ok(self.generator.generate(request).await?)
    }

    fn bound_input(&self, text: &str) -> String {
        match text.char_indices().nth(self.settings.summary_input_chars) {
            Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
            None => text.to_string(),
        }
    }
}

/// The collaborator's own message, without the top-level error prefix.
fn failure_message(e: &Error) -> String {
    match e {
        Error::Extraction(inner) => inner.to_string(),
        Error::Generation(inner) => inner.to_string(),
        other => other.to_string(),
    }
}
