//! Document store on the local filesystem
//!
//! Directory structure:
//! ```text
//! {root}/
//! ├── datas/
//! │   └── collections.json   # Registry document
//! └── {collection}/
//!     └── {document-id}.json # One file per card
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;

use super::{
    content_revision, decode_body, new_document_id, path_segment, DocumentStore, Precondition, Result,
    Revision, StoreError, StoredDocument,
};

/// Storage manager keeping each document in its own JSON file
pub struct FileStore {
    root: PathBuf,
    /// Serialises read-compare-write sequences within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Get the directory for a collection
    fn collection_dir(&self, collection: &str) -> Result<PathBuf> {
        Ok(self.root.join(path_segment(collection)?))
    }

    /// Get the path for a specific document
    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        Ok(self
            .collection_dir(collection)?
            .join(format!("{}.json", path_segment(id)?)))
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        let path = self.document_path(collection, id)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(StoredDocument {
            id: id.to_string(),
            revision: content_revision(&bytes),
            data: decode_body(collection, id, &bytes),
        }))
    }

    async fn write(&self, collection: &str, id: &str, data: &Value) -> Result<Revision> {
        fs::create_dir_all(self.collection_dir(collection)?).await?;
        let bytes = serde_json::to_vec_pretty(data)?;
        fs::write(self.document_path(collection, id)?, &bytes).await?;
        Ok(content_revision(&bytes))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        self.read(collection, id).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let dir = self.collection_dir(collection)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let id = urlencoding::decode(stem)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| stem.to_string());
            if let Some(doc) = self.read(collection, &id).await? {
                documents.push(doc);
            }
        }

        Ok(documents)
    }

    async fn create(&self, collection: &str, data: Value) -> Result<String> {
        let _guard = self.write_lock.lock().await;
        let mut id = new_document_id();
        while fs::try_exists(self.document_path(collection, &id)?).await? {
            id = new_document_id();
        }
        self.write(collection, &id, &data).await?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(collection, id, &data).await?;
        Ok(())
    }

    async fn set_if(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        precondition: Precondition,
    ) -> Result<Revision> {
        let _guard = self.write_lock.lock().await;
        let current = self.read(collection, id).await?;

        let holds = match (&precondition, &current) {
            (Precondition::Absent, None) => true,
            (Precondition::Matches(expected), Some(doc)) => *expected == doc.revision,
            _ => false,
        };
        if !holds {
            return Err(StoreError::Conflict);
        }

        self.write(collection, id, &data).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.document_path(collection, id)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
