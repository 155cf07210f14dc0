//! Card store
//!
//! Local mirror of the cards in the active collection. The mirror is replaced
//! wholesale on every load; adds and deletes are applied locally only after
//! the store accepted them, and never re-fetched.

use super::models::{Card, CardFields};
use crate::store::{DocumentStore, Result};

#[derive(Debug, Clone, Default)]
pub struct CardStore {
    collection: Option<String>,
    cards: Vec<Card>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection the mirror was last loaded for
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Replace the mirror with every card stored under `collection`.
    ///
    /// On failure the mirror is left empty for the new collection.
    pub async fn load_for(&mut self, store: &dyn DocumentStore, collection: &str) -> Result<usize> {
        self.collection = Some(collection.to_string());
        self.cards.clear();

        let documents = store.list(collection).await?;
        self.cards = documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<CardFields>(doc.data) {
                Ok(fields) => Some(Card::new(doc.id, fields)),
                Err(e) => {
                    log::warn!("Skipping malformed card {} in '{}': {}", doc.id, collection, e);
                    None
                }
            })
            .collect();

        log::debug!("Loaded {} cards for '{}'", self.cards.len(), collection);
        Ok(self.cards.len())
    }

    /// Store a new card in the loaded collection.
    ///
    /// Returns `None` without touching the store when either field is blank
    /// or no collection is loaded.
    pub async fn add_card(
        &mut self,
        store: &dyn DocumentStore,
        term: &str,
        definition: &str,
    ) -> Result<Option<Card>> {
        let Some(fields) = CardFields::validated(term, definition) else {
            return Ok(None);
        };
        let Some(collection) = self.collection.as_deref() else {
            log::warn!("add_card called before any collection was loaded");
            return Ok(None);
        };

        let id = store.create(collection, serde_json::to_value(&fields)?).await?;
        let card = Card::new(id, fields);
        self.cards.push(card.clone());
        Ok(Some(card))
    }

    /// Rewrite the term and definition of an existing card.
    ///
    /// Returns `None` when either field is blank or the card is not loaded.
    pub async fn update_card(
        &mut self,
        store: &dyn DocumentStore,
        id: &str,
        term: &str,
        definition: &str,
    ) -> Result<Option<Card>> {
        let Some(fields) = CardFields::validated(term, definition) else {
            return Ok(None);
        };
        let (Some(collection), Some(pos)) = (
            self.collection.as_deref(),
            self.cards.iter().position(|c| c.id == id),
        ) else {
            return Ok(None);
        };

        store
            .set(collection, id, serde_json::to_value(&fields)?)
            .await?;
        let card = Card::new(id.to_string(), fields);
        self.cards[pos] = card.clone();
        Ok(Some(card))
    }

    /// Delete a card remotely, then drop it from the mirror.
    ///
    /// If the store rejects the delete the local card stays. Returns whether
    /// a local card was removed.
    pub async fn delete_card(&mut self, store: &dyn DocumentStore, id: &str) -> Result<bool> {
        let Some(collection) = self.collection.as_deref() else {
            return Ok(false);
        };

        store.delete(collection, id).await?;

        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        Ok(self.cards.len() != before)
    }

    /// Delete every card document of a collection. Returns how many were removed.
    pub async fn purge(store: &dyn DocumentStore, collection: &str) -> Result<usize> {
        let documents = store.list(collection).await?;
        let count = documents.len();
        for doc in documents {
            store.delete(collection, &doc.id).await?;
        }
        log::info!("Purged {} cards from '{}'", count, collection);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn loaded(store: &MemoryStore, collection: &str) -> CardStore {
        let mut cards = CardStore::new();
        cards.load_for(store, collection).await.unwrap();
        cards
    }

    fn ids(cards: &CardStore) -> Vec<String> {
        let mut ids: Vec<String> = cards.cards().iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_load_replaces_mirror() {
        let store = MemoryStore::new();
        store.create("german", json!({"term": "Haus", "definition": "house"})).await.unwrap();
        store.create("german", json!({"term": "Baum", "definition": "tree"})).await.unwrap();
        store.create("latin", json!({"term": "domus", "definition": "house"})).await.unwrap();

        let mut cards = loaded(&store, "german").await;
        assert_eq!(cards.len(), 2);

        cards.load_for(&store, "latin").await.unwrap();
        assert_eq!(cards.collection(), Some("latin"));
        assert_eq!(cards.cards()[0].term, "domus");
    }

    #[tokio::test]
    async fn test_load_skips_malformed_documents() {
        let store = MemoryStore::new();
        store.create("german", json!({"term": "Haus"})).await.unwrap();
        store.create("german", json!({"nothing": true})).await.unwrap();

        let cards = loaded(&store, "german").await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards.cards()[0].definition, "");
    }

    #[tokio::test]
    async fn test_load_failure_empties_mirror() {
        let store = MemoryStore::new();
        store.create("german", json!({"term": "Haus", "definition": "house"})).await.unwrap();
        let mut cards = loaded(&store, "german").await;

        store.set_unavailable(true);
        assert!(cards.load_for(&store, "latin").await.is_err());
        assert!(cards.is_empty());
        assert_eq!(cards.collection(), Some("latin"));
    }

    #[tokio::test]
    async fn test_add_then_delete_round_trip() {
        let store = MemoryStore::new();
        store.create("german", json!({"term": "Haus", "definition": "house"})).await.unwrap();
        let mut cards = loaded(&store, "german").await;
        let before = ids(&cards);

        let card = cards.add_card(&store, "x", "y").await.unwrap().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(store.document_count("german"), 2);

        assert!(cards.delete_card(&store, &card.id).await.unwrap());
        assert_eq!(ids(&cards), before);
        assert_eq!(store.document_count("german"), 1);
    }

    #[tokio::test]
    async fn test_add_validation_noop() {
        let store = MemoryStore::new();
        let mut cards = loaded(&store, "german").await;

        assert!(cards.add_card(&store, "", "y").await.unwrap().is_none());
        assert!(cards.add_card(&store, "x", "").await.unwrap().is_none());
        assert!(cards.add_card(&store, "  ", "y").await.unwrap().is_none());
        assert!(cards.is_empty());
        assert_eq!(store.document_count("german"), 0);
    }

    #[tokio::test]
    async fn test_add_failure_keeps_mirror() {
        let store = MemoryStore::new();
        let mut cards = loaded(&store, "german").await;

        store.set_unavailable(true);
        assert!(cards.add_card(&store, "Haus", "house").await.is_err());
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_local_card() {
        let store = MemoryStore::new();
        let mut cards = loaded(&store, "german").await;
        let card = cards.add_card(&store, "Haus", "house").await.unwrap().unwrap();

        store.set_unavailable(true);
        assert!(cards.delete_card(&store, &card.id).await.is_err());
        assert_eq!(cards.get(&card.id), Some(&card));
    }

    #[tokio::test]
    async fn test_update_card() {
        let store = MemoryStore::new();
        let mut cards = loaded(&store, "german").await;
        let card = cards.add_card(&store, "Haus", "hous").await.unwrap().unwrap();

        let updated = cards
            .update_card(&store, &card.id, "Haus", "house")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, card.id);
        assert_eq!(cards.get(&card.id).unwrap().definition, "house");

        let stored = store.get("german", &card.id).await.unwrap().unwrap();
        assert_eq!(stored.data["definition"], "house");

        assert!(cards.update_card(&store, "missing", "a", "b").await.unwrap().is_none());
        assert!(cards.update_card(&store, &card.id, "Haus", " ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge() {
        let store = MemoryStore::new();
        store.create("latin", json!({"term": "domus", "definition": "house"})).await.unwrap();
        store.create("latin", json!({"term": "arbor", "definition": "tree"})).await.unwrap();

        assert_eq!(CardStore::purge(&store, "latin").await.unwrap(), 2);
        assert_eq!(store.document_count("latin"), 0);
    }
}
