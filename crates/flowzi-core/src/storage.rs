//! Collaborator contracts for persistence: the remote document store and the
//! durable key-value flag store.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::CoreError;

/// A raw document as delivered by the store. Always carries its `id`.
pub type Document = Map<String, Value>;

/// Receives the full contents of a collection every time it changes.
pub type SnapshotCallback = Box<dyn Fn(Vec<Document>) + Send + Sync>;

/// Receives subscription failures.
pub type ErrorCallback = Box<dyn Fn(CoreError) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Address of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

/// Remote document database with live subscriptions.
pub trait DocumentStore: Send + Sync {
    /// Registers a listener. The current snapshot is delivered once the
    /// subscription is live and again after every change.
    fn subscribe(
        &self,
        collection: &str,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> Result<SubscriptionId, CoreError>;

    fn unsubscribe(&self, id: SubscriptionId);

    fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError>;

    /// Writes `fields` into the document, creating it when absent and leaving
    /// unspecified fields untouched.
    fn write_merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), CoreError>;

    /// Stores a new document and returns its generated id.
    fn add_document(&self, collection: &str, fields: Document) -> Result<String, CoreError>;

    fn delete_document(&self, collection: &str, id: &str) -> Result<(), CoreError>;

    /// Deletes every referenced document, or none of them.
    fn batch_delete(&self, refs: &[DocumentRef]) -> Result<(), CoreError>;
}

/// Durable string flags keyed by name.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
}

/// Serializes a value into a document body.
pub fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, CoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Validation(format!(
            "expected an object document, got {}",
            other
        ))),
    }
}

/// Decodes a single document.
pub fn decode_document<T: DeserializeOwned>(document: Document) -> Result<T, CoreError> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// Decodes a snapshot, skipping documents that do not match the expected shape.
pub fn decode_documents<T: DeserializeOwned>(collection: &str, documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match decode_document(document) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(collection, id = %id, error = %err, "skipping malformed document");
                    None
                }
            }
        })
        .collect()
}
