//! Collection registry
//!
//! Keeps the ordered list of collection names mirrored from the registry
//! document. Every write to that document is a compare-and-swap against the
//! revision just read, so concurrent appends from other clients are merged
//! rather than overwritten.

use thiserror::Error;

use super::models::{
    normalize_collection_name, RegistryDocument, REGISTRY_COLLECTION, REGISTRY_DOCUMENT,
};
use crate::store::{DocumentStore, Precondition, StoreError};

/// Attempts at a registry write before giving up on a contended document
pub const MAX_REGISTRY_ATTEMPTS: usize = 5;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Registry document kept changing, gave up after {0} attempts")]
    Contended(usize),

    #[error("Cannot remove the last collection")]
    LastCollection,
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// What a registry update decided after looking at the stored list
enum RegistryUpdate {
    /// Stored list is fine as is
    Keep(Vec<String>),
    /// Replace the stored list
    Write(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    names: Vec<String>,
    active: Option<String>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Switch the active collection. Unknown names are ignored.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.active = Some(name.to_string());
        true
    }

    /// Load the registry, seeding the default collections when the document
    /// is missing, empty or malformed. The first entry becomes active.
    pub async fn initialize(&mut self, store: &dyn DocumentStore) -> Result<()> {
        let list = update_registry(store, |stored| {
            Ok(match stored {
                Some(doc) => RegistryUpdate::Keep(doc.list),
                None => {
                    log::info!("Registry missing or malformed, seeding defaults");
                    RegistryUpdate::Write(RegistryDocument::defaults().list)
                }
            })
        })
        .await?;

        self.active = list.first().cloned();
        self.names = list;
        Ok(())
    }

    /// Register a new collection and make it active.
    ///
    /// Returns the normalized name, or `None` when the candidate is blank,
    /// reserved or already registered (nothing is written in that case).
    pub async fn add_collection(
        &mut self,
        store: &dyn DocumentStore,
        candidate: &str,
    ) -> Result<Option<String>> {
        let name = normalize_collection_name(candidate);
        if name.is_empty() || name == REGISTRY_COLLECTION || self.contains(&name) {
            return Ok(None);
        }

        let local = self.names.clone();
        let list = update_registry(store, |stored| {
            let mut list = stored.map(|doc| doc.list).unwrap_or_else(|| local.clone());
            if list.contains(&name) {
                return Ok(RegistryUpdate::Keep(list));
            }
            list.push(name.clone());
            Ok(RegistryUpdate::Write(list))
        })
        .await?;

        log::info!("Added collection '{}'", name);
        self.names = list;
        self.active = Some(name.clone());
        Ok(Some(name))
    }

    /// Unregister a collection. Returns `false` if it was not registered.
    ///
    /// The last remaining collection cannot be removed. If the removed name
    /// was active, the first remaining collection becomes active.
    pub async fn remove_collection(&mut self, store: &dyn DocumentStore, name: &str) -> Result<bool> {
        if !self.contains(name) {
            return Ok(false);
        }

        let local = self.names.clone();
        let list = update_registry(store, |stored| {
            let mut list = stored.map(|doc| doc.list).unwrap_or_else(|| local.clone());
            if !list.iter().any(|n| n == name) {
                return Ok(RegistryUpdate::Keep(list));
            }
            list.retain(|n| n != name);
            if list.is_empty() {
                return Err(RegistryError::LastCollection);
            }
            Ok(RegistryUpdate::Write(list))
        })
        .await?;

        log::info!("Removed collection '{}'", name);
        self.names = list;
        if self.active.as_deref().map_or(true, |a| !self.contains(a)) {
            self.active = self.names.first().cloned();
        }
        Ok(true)
    }
}

/// Read-modify-write of the registry document, retried while other writers
/// win the race. Returns the list now stored.
async fn update_registry<F>(store: &dyn DocumentStore, mut update: F) -> Result<Vec<String>>
where
    F: FnMut(Option<RegistryDocument>) -> Result<RegistryUpdate>,
{
    for attempt in 1..=MAX_REGISTRY_ATTEMPTS {
        let current = store.get(REGISTRY_COLLECTION, REGISTRY_DOCUMENT).await?;
        let (stored, precondition) = match &current {
            Some(doc) => (
                RegistryDocument::parse(&doc.data),
                Precondition::Matches(doc.revision.clone()),
            ),
            None => (None, Precondition::Absent),
        };

        let list = match update(stored)? {
            RegistryUpdate::Keep(list) => return Ok(list),
            RegistryUpdate::Write(list) => list,
        };

        let data = serde_json::to_value(RegistryDocument { list: list.clone() })
            .map_err(StoreError::from)?;
        match store
            .set_if(REGISTRY_COLLECTION, REGISTRY_DOCUMENT, data, precondition)
            .await
        {
            Ok(_) => return Ok(list),
            Err(StoreError::Conflict) => {
                log::debug!("Registry write lost a race (attempt {}), retrying", attempt);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(RegistryError::Contended(MAX_REGISTRY_ATTEMPTS))
}
