//! Conversation handling for Skimmer.
//!
//! A message goes through three steps:
//!
//! 1. **Classify**: [`classify`] routes it to the URL, content or follow-up pipeline
//! 2. **Collaborate**: the [`TurnOrchestrator`] calls the extractor and/or generator,
//!    building follow-up context with the [`ContextWindowBuilder`]
//! 3. **Record**: the user entry and the assistant entry are appended to the
//!    session's log
//!
//! Extraction and generation failures become apology replies; only
//! validation and storage errors escape a turn.

pub mod bootstrap;
pub mod classifier;
pub mod context_window;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use bootstrap::build_orchestrator;
pub use classifier::{Intent, classify};
pub use context_window::ContextWindowBuilder;
pub use orchestrator::{
    ConversationSettings, InboundMessage, NO_CONTEXT_REPLY, TRUNCATION_MARKER, TurnOrchestrator,
    TurnReply,
};
