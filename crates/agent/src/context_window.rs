//! Context window for follow-up questions.
//!
//! Renders the tail of a session's log as a compact transcript. Long entries
//! are cut to an excerpt so the prompt stays bounded no matter how large the
//! summarized content was.

use skimmer_config::ConversationConfig;
use skimmer_core::conversation::{ConversationEntry, EntryKind, Role};
use skimmer_core::generator::GenerationRequest;

const ELLIPSIS: &str = "...";

/// Builds the prior-conversation block sent with a follow-up question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindowBuilder {
    max_entries: usize,
    user_excerpt_chars: usize,
    assistant_excerpt_chars: usize,
}

impl Default for ContextWindowBuilder {
    fn default() -> Self {
        Self {
            max_entries: 5,
            user_excerpt_chars: 200,
            assistant_excerpt_chars: 300,
        }
    }
}

impl ContextWindowBuilder {
    pub fn from_config(config: &ConversationConfig) -> Self {
        Self {
            max_entries: config.context_entries,
            user_excerpt_chars: config.user_excerpt_chars,
            assistant_excerpt_chars: config.assistant_excerpt_chars,
        }
    }

    /// The follow-up request for `question`, or `None` when there is no prior
    /// conversation to answer from.
    pub fn build(
        &self,
        entries: &[ConversationEntry],
        question: &str,
    ) -> Option<GenerationRequest> {
        if entries.is_empty() {
            return None;
        }
        Some(GenerationRequest::followup(question, self.render(entries)))
    }

    /// Render the most recent entries, oldest first, one per line.
    pub fn render(&self, entries: &[ConversationEntry]) -> String {
        let start = entries.len().saturating_sub(self.max_entries);
        entries[start..]
            .iter()
            .map(|entry| self.render_entry(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_entry(&self, entry: &ConversationEntry) -> String {
        match entry.role {
            Role::User if entry.kind == Some(EntryKind::UrlSummary) => {
                let url = entry.source_url.as_deref().unwrap_or(&entry.content);
                format!("User submitted URL: {url}")
            }
            Role::User | Role::System => format!(
                "{}: {}",
                entry.role,
                excerpt(&entry.content, self.user_excerpt_chars)
            ),
            Role::Assistant => format!(
                "Assistant: {}",
                excerpt(&entry.content, self.assistant_excerpt_chars)
            ),
        }
    }
}

/// The first `max` characters of `text`, with an ellipsis if anything was cut.
fn excerpt(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::generator::GenerationMode;

    fn url_entry(url: &str) -> ConversationEntry {
        ConversationEntry::user(url)
            .with_kind(EntryKind::UrlSummary)
            .with_source_url(url)
    }

    #[test]
    fn keeps_only_the_last_five_in_order() {
        let entries: Vec<_> = (1..=7)
            .map(|i| {
                if i % 2 == 1 {
                    ConversationEntry::user(format!("question {i}"))
                } else {
                    ConversationEntry::assistant(format!("answer {i}"))
                }
            })
            .collect();

        let rendered = ContextWindowBuilder::default().render(&entries);
        assert_eq!(
            rendered,
            "User: question 3\nAssistant: answer 4\nUser: question 5\nAssistant: answer 6\nUser: question 7"
        );
    }

    #[test]
    fn url_entries_render_the_url() {
        let entries = vec![
            url_entry("https://example.com/post"),
            ConversationEntry::assistant("It is about Rust.").with_kind(EntryKind::UrlSummary),
        ];
        assert_eq!(
            ContextWindowBuilder::default().render(&entries),
            "User submitted URL: https://example.com/post\nAssistant: It is about Rust."
        );
    }

    #[test]
    fn user_content_cut_at_200() {
        let exact = ConversationEntry::user("u".repeat(200)).with_kind(EntryKind::RawSummary);
        let long = ConversationEntry::user("v".repeat(201)).with_kind(EntryKind::RawSummary);
        let builder = ContextWindowBuilder::default();

        assert_eq!(builder.render(&[exact]), format!("User: {}", "u".repeat(200)));
        assert_eq!(builder.render(&[long]), format!("User: {}...", "v".repeat(200)));
    }

    #[test]
    fn assistant_content_cut_at_300() {
        let exact = ConversationEntry::assistant("a".repeat(300));
        let long = ConversationEntry::assistant("b".repeat(450));
        let builder = ContextWindowBuilder::default();

        assert_eq!(builder.render(&[exact]), format!("Assistant: {}", "a".repeat(300)));
        assert_eq!(builder.render(&[long]), format!("Assistant: {}...", "b".repeat(300)));
    }

    #[test]
    fn excerpts_respect_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll...");
        assert_eq!(excerpt("日本語", 3), "日本語");
    }

    #[test]
    fn empty_history_builds_nothing() {
        assert!(ContextWindowBuilder::default().build(&[], "Why?").is_none());
    }

    #[test]
    fn build_pairs_context_with_question() {
        let entries = vec![ConversationEntry::user("Some pasted text. More. Even more.")];
        let request = ContextWindowBuilder::default()
            .build(&entries, "What was it about?")
            .unwrap();
        assert_eq!(request.mode, GenerationMode::Followup);
        assert_eq!(request.text, "What was it about?");
        assert_eq!(
            request.context.as_deref(),
            Some("User: Some pasted text. More. Even more.")
        );
    }

    #[test]
    fn configured_limits() {
        let config = ConversationConfig {
            context_entries: 2,
            user_excerpt_chars: 3,
            ..ConversationConfig::default()
        };
        let entries = vec![
            ConversationEntry::user("dropped"),
            ConversationEntry::user("kept one"),
            ConversationEntry::system("kept two"),
        ];
        assert_eq!(
            ContextWindowBuilder::from_config(&config).render(&entries),
            "User: kep...\nSystem: kep..."
        );
    }
}
