//! Flashcard collections for study
//!
//! This module provides:
//! - The collection registry (ordered list of collection names)
//! - The card store (mirror of the active collection's cards)
//! - The learning cycler (one card at a time, answer hidden until revealed)

pub mod cards;
pub mod learning;
pub mod models;
pub mod registry;

pub use cards::CardStore;
pub use learning::LearningCycler;
pub use models::*;
pub use registry::{CollectionRegistry, RegistryError};
