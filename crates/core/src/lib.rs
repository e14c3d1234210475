//! # Skimmer Core
//!
//! Domain types, traits, and error definitions for Skimmer, a session-aware
//! summarization assistant. This crate has **no framework dependencies**: it
//! defines the model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here. Implementations live in their
//! respective crates:
//! - [`SessionStorage`] in `skimmer-memory`
//! - [`Extractor`] in `skimmer-extract`
//! - [`Generator`] in `skimmer-providers`
//!
//! This keeps the orchestration logic testable with scripted stand-ins.

pub mod conversation;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod storage;

// Re-export key types at crate root for ergonomics
pub use conversation::{ConversationEntry, EntryKind, Role, SessionLog, SessionStats};
pub use error::{Error, ExtractionError, GenerationError, StorageError, ValidationError};
pub use extractor::Extractor;
pub use generator::{GenerationMode, GenerationRequest, Generator};
pub use storage::SessionStorage;
