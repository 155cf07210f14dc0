//! Document store abstraction
//!
//! Collections and cards live in a document store: named collections of JSON
//! documents addressed by id. The store owns the durable copy; everything the
//! client holds is a best-effort mirror.
//!
//! Backends:
//! - [`MemoryStore`] keeps documents in process memory
//! - [`FileStore`] keeps one JSON file per document on disk
//! - [`WebDavStore`] keeps one JSON resource per document on a WebDAV server

pub mod file;
pub mod memory;
pub mod webdav;

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use webdav::{WebDavClient, WebDavCredentials, WebDavStore};

/// Length of store-assigned document ids
pub const DOCUMENT_ID_LEN: usize = 20;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Conflict: document was modified concurrently")]
    Conflict,

    #[error("Invalid collection or document name: {0:?}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Opaque version token of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(pub String);

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document as read from the store
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub revision: Revision,
    pub data: Value,
}

/// Condition a conditional write must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The document must not exist yet
    Absent,
    /// The document must still be at this revision
    Matches(Revision),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document, `None` if it does not exist
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>>;

    /// Read every document of a collection. Order is unspecified.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>>;

    /// Create a document under a fresh store-assigned id
    async fn create(&self, collection: &str, data: Value) -> Result<String>;

    /// Create or overwrite a document unconditionally
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Write a document only if `precondition` holds, returning the new revision.
    ///
    /// Fails with [`StoreError::Conflict`] when it does not.
    async fn set_if(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        precondition: Precondition,
    ) -> Result<Revision>;

    /// Remove a document. Removing a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }
}

/// Generate a document id in the same shape hosted document stores use
pub fn new_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Encode a collection or document name as a single path segment
pub(crate) fn path_segment(name: &str) -> Result<String> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(urlencoding::encode(name).into_owned())
}

/// Parse a stored body. Bodies that are not JSON come back as `Value::Null`
/// so callers can still see the document and its revision.
pub(crate) fn decode_body(collection: &str, id: &str, bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        log::warn!("Document {}/{} is not valid JSON: {}", collection, id, e);
        Value::Null
    })
}

/// SHA-256 hex digest of a document body
pub(crate) fn content_revision(bytes: &[u8]) -> Revision {
    use sha2::{Digest, Sha256};
    Revision(hex::encode(Sha256::digest(bytes)))
}
