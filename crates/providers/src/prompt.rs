//! Prompt templates for the two generation modes.

use skimmer_core::generator::{GenerationMode, GenerationRequest};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes web pages and documents. \
Write a concise summary of the content you are given: open with one or two sentences on what it is about, \
then list the key points as short bullet points. Stick to what the content says and do not add outside information.";

pub const FOLLOWUP_SYSTEM_PROMPT: &str = "You are a helpful assistant answering follow-up questions about content \
the user has already had summarized. Use the previous conversation to answer. If the conversation does not contain \
the answer, say so plainly instead of guessing. Keep answers short and direct.";

/// A system and user message pair ready to send to a chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

pub fn build_prompt(request: &GenerationRequest) -> Prompt {
    match request.mode {
        GenerationMode::Summary => Prompt {
            system: SUMMARY_SYSTEM_PROMPT,
            user: match request.context.as_deref() {
                Some(url) => format!("Summarize the following content from {url}:\n\n{}", request.text),
                None => format!("Summarize the following content:\n\n{}", request.text),
            },
        },
        GenerationMode::Followup => Prompt {
            system: FOLLOWUP_SYSTEM_PROMPT,
            user: format!(
                "Previous conversation:\n{}\n\nQuestion: {}",
                request.context.as_deref().unwrap_or_default(),
                request.text
            ),
        },
    }
}
