//! Flashcard study tool
//!
//! Term/definition cards grouped into named collections, a learning mode that
//! cycles through them, and single-word translation lookups through a small
//! proxy.

pub mod config;
pub mod flashcards;
pub mod session;
pub mod store;
pub mod translate;

pub use config::{AppConfig, ProxyConfig, SuggestionPolicy};
pub use session::StudySession;
