//! In-process document store

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{
    new_document_id, DocumentStore, Precondition, Result, Revision, StoreError, StoredDocument,
};

#[derive(Debug, Clone)]
struct Entry {
    revision: u64,
    data: Value,
}

/// Documents held in memory, lost when the process exits
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Entry>>>,
    next_revision: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the backend were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of documents currently stored in a collection
    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    fn bump(&self) -> u64 {
        self.next_revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, BTreeMap<String, Entry>>>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn to_document(id: &str, entry: &Entry) -> StoredDocument {
    StoredDocument {
        id: id.to_string(),
        revision: Revision(entry.revision.to_string()),
        data: entry.data.clone(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        self.check_available()?;
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|entry| to_document(id, entry)))
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        self.check_available()?;
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, e)| to_document(id, e)).collect())
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, data: Value) -> Result<String> {
        self.check_available()?;
        let revision = self.bump();
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut id = new_document_id();
        while docs.contains_key(&id) {
            id = new_document_id();
        }
        docs.insert(id.clone(), Entry { revision, data });
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.check_available()?;
        let revision = self.bump();
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), Entry { revision, data });
        Ok(())
    }

    async fn set_if(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        precondition: Precondition,
    ) -> Result<Revision> {
        self.check_available()?;
        let revision = self.bump();
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();

        let holds = match (&precondition, docs.get(id)) {
            (Precondition::Absent, None) => true,
            (Precondition::Matches(expected), Some(current)) => {
                expected.0 == current.revision.to_string()
            }
            _ => false,
        };
        if !holds {
            return Err(StoreError::Conflict);
        }

        docs.insert(id.to_string(), Entry { revision, data });
        Ok(Revision(revision.to_string()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check_available()?;
        let mut collections = self.lock()?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = MemoryStore::new();
        let id = store.create("german", json!({"term": "Haus"})).await.unwrap();

        let doc = store.get("german", &id).await.unwrap().unwrap();
        assert_eq!(doc.data["term"], "Haus");
        assert!(store.exists("german", &id).await.unwrap());

        store.delete("german", &id).await.unwrap();
        assert!(store.get("german", &id).await.unwrap().is_none());
        // Deleting again is fine
        store.delete("german", &id).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_if_preconditions() {
        let store = MemoryStore::new();

        let rev = store
            .set_if("datas", "collections", json!({"list": []}), Precondition::Absent)
            .await
            .unwrap();
        let again = store
            .set_if("datas", "collections", json!({"list": []}), Precondition::Absent)
            .await;
        assert!(matches!(again, Err(StoreError::Conflict)));

        let next = store
            .set_if("datas", "collections", json!({"list": ["a"]}), Precondition::Matches(rev.clone()))
            .await
            .unwrap();
        assert_ne!(next, rev);

        let stale = store
            .set_if("datas", "collections", json!({"list": ["b"]}), Precondition::Matches(rev))
            .await;
        assert!(matches!(stale, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.list("german").await, Err(StoreError::Unavailable(_))));
        store.set_unavailable(false);
        assert!(store.list("german").await.unwrap().is_empty());
    }
}
