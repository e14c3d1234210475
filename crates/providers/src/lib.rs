//! Language-model backends for Skimmer.
//!
//! All backends implement [`skimmer_core::Generator`]. Use
//! [`build_from_config`] to get the one named in the config.

pub mod openai_compat;
pub mod prompt;
pub mod router;

pub use openai_compat::OpenAiCompatGenerator;
pub use prompt::{Prompt, build_prompt};
pub use router::{UnconfiguredGenerator, build_from_config, default_base_url};
