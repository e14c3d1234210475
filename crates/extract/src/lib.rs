//! Page extraction for Skimmer.
//!
//! [`WebExtractor`] implements [`skimmer_core::Extractor`]: fetch a URL,
//! check it is an HTML page, and reduce it to plain text.

pub mod html;
pub mod web;

pub use html::html_to_text;
pub use web::{WebExtractor, validate_url};
