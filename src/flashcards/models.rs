//! Data models for the flashcard system

use serde::{Deserialize, Serialize};

/// Collection holding the registry document
pub const REGISTRY_COLLECTION: &str = "datas";

/// Id of the registry document
pub const REGISTRY_DOCUMENT: &str = "collections";

/// Collections seeded when no registry exists yet, in display order
pub const DEFAULT_COLLECTIONS: [&str; 4] = ["english", "german", "latin", "italian"];

/// The single document listing every collection name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub list: Vec<String>,
}

impl RegistryDocument {
    pub fn defaults() -> Self {
        Self {
            list: DEFAULT_COLLECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a stored registry. Anything that is not a non-empty list of
    /// names counts as malformed.
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        let doc: Self = serde_json::from_value(data.clone()).ok()?;
        let list = dedup(doc.list);
        (!list.is_empty()).then_some(Self { list })
    }
}

/// Drop repeated names, keeping the first occurrence
fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Trim and lowercase a user-entered collection name
pub fn normalize_collection_name(candidate: &str) -> String {
    candidate.trim().to_lowercase()
}

/// Fields stored in a card document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFields {
    pub term: String,
    #[serde(default)]
    pub definition: String,
}

impl CardFields {
    /// Trimmed fields, or `None` when either side is blank
    pub fn validated(term: &str, definition: &str) -> Option<Self> {
        let term = term.trim();
        let definition = definition.trim();
        if term.is_empty() || definition.is_empty() {
            return None;
        }
        Some(Self {
            term: term.to_string(),
            definition: definition.to_string(),
        })
    }
}

/// A term/definition pair belonging to one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub term: String,
    pub definition: String,
}

impl Card {
    pub fn new(id: String, fields: CardFields) -> Self {
        Self {
            id,
            term: fields.term,
            definition: fields.definition,
        }
    }
}
