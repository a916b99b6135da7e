//! In-memory document database with snapshot subscriptions.
//!
//! Listeners receive the full collection, in insertion order, right after they
//! subscribe and again after every write that touches their collection.
//! Callbacks always run after the internal lock is released, so a listener may
//! call back into the store.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use serde_json::Value;

use flowzi_core::{
    CoreError, Document, DocumentRef, DocumentStore, ErrorCallback, SnapshotCallback,
    SubscriptionId,
};

type SharedSnapshot = Arc<dyn Fn(Vec<Document>) + Send + Sync>;
type SharedError = Arc<dyn Fn(CoreError) + Send + Sync>;

struct Listener {
    id: SubscriptionId,
    collection: String,
    on_snapshot: SharedSnapshot,
    on_error: SharedError,
}

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Vec<Document>>,
    listeners: Vec<Listener>,
    next_subscription: u64,
    offline: bool,
}

impl State {
    fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections.get(collection).cloned().unwrap_or_default()
    }

    fn deliveries(&self, collection: &str) -> Vec<(SharedSnapshot, Vec<Document>)> {
        let snapshot = self.snapshot(collection);
        self.listeners
            .iter()
            .filter(|listener| listener.collection == collection)
            .map(|listener| (listener.on_snapshot.clone(), snapshot.clone()))
            .collect()
    }

    fn ensure_online(&self) -> Result<(), CoreError> {
        if self.offline {
            Err(CoreError::Store("document store is offline".into()))
        } else {
            Ok(())
        }
    }
}

fn document_id(document: &Document) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    state: Mutex<State>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Store("document store lock poisoned".into()))
    }

    /// Replaces a collection wholesale, as when loading a fixture.
    pub fn seed(&self, collection: &str, documents: Vec<Document>) -> Result<(), CoreError> {
        let deliveries = {
            let mut state = self.lock()?;
            let mut stored = Vec::with_capacity(documents.len());
            for mut document in documents {
                if document_id(&document).is_none() {
                    let id = uuid::Uuid::new_v4().simple().to_string();
                    document.insert("id".into(), Value::String(id));
                }
                stored.push(document);
            }
            state.collections.insert(collection.to_string(), stored);
            state.deliveries(collection)
        };
        deliver(deliveries);
        Ok(())
    }

    /// While offline every write fails and live listeners receive the error.
    pub fn set_offline(&self, offline: bool) {
        let errors: Vec<SharedError> = match self.lock() {
            Ok(mut state) => {
                state.offline = offline;
                if offline {
                    state.listeners.iter().map(|l| l.on_error.clone()).collect()
                } else {
                    Vec::new()
                }
            }
            Err(_) => Vec::new(),
        };
        for on_error in errors {
            on_error(CoreError::Store("document store went offline".into()));
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().map(|state| state.listeners.len()).unwrap_or(0)
    }

    pub fn count(&self, collection: &str) -> usize {
        self.lock()
            .map(|state| state.collections.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

fn deliver(deliveries: Vec<(SharedSnapshot, Vec<Document>)>) {
    for (callback, snapshot) in deliveries {
        callback(snapshot);
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn subscribe(
        &self,
        collection: &str,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> Result<SubscriptionId, CoreError> {
        let on_snapshot: SharedSnapshot = Arc::from(on_snapshot);
        let (id, snapshot) = {
            let mut state = self.lock()?;
            state.ensure_online()?;
            state.next_subscription += 1;
            let id = SubscriptionId(state.next_subscription);
            state.listeners.push(Listener {
                id,
                collection: collection.to_string(),
                on_snapshot: on_snapshot.clone(),
                on_error: Arc::from(on_error),
            });
            (id, state.snapshot(collection))
        };
        tracing::debug!(collection, subscription = %id, "listener attached");
        on_snapshot(snapshot);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut state) = self.lock() {
            state.listeners.retain(|listener| listener.id != id);
        }
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError> {
        let state = self.lock()?;
        state.ensure_online()?;
        Ok(state.snapshot(collection))
    }

    fn write_merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), CoreError> {
        let deliveries = {
            let mut state = self.lock()?;
            state.ensure_online()?;
            let documents = state.collections.entry(collection.to_string()).or_default();
            match documents.iter_mut().find(|doc| document_id(doc) == Some(id)) {
                Some(existing) => existing.extend(fields),
                None => documents.push(fields),
            }
            if let Some(document) = documents.last_mut().filter(|doc| document_id(doc).is_none()) {
                document.insert("id".into(), Value::String(id.to_string()));
            }
            state.deliveries(collection)
        };
        deliver(deliveries);
        Ok(())
    }

    fn add_document(&self, collection: &str, fields: Document) -> Result<String, CoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let deliveries = {
            let mut state = self.lock()?;
            state.ensure_online()?;
            let mut document = fields;
            document.insert("id".into(), Value::String(id.clone()));
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(document);
            state.deliveries(collection)
        };
        deliver(deliveries);
        Ok(id)
    }

    fn delete_document(&self, collection: &str, id: &str) -> Result<(), CoreError> {
        let deliveries = {
            let mut state = self.lock()?;
            state.ensure_online()?;
            if let Some(documents) = state.collections.get_mut(collection) {
                documents.retain(|doc| document_id(doc) != Some(id));
            }
            state.deliveries(collection)
        };
        deliver(deliveries);
        Ok(())
    }

    fn batch_delete(&self, refs: &[DocumentRef]) -> Result<(), CoreError> {
        let deliveries = {
            let mut state = self.lock()?;
            state.ensure_online()?;
            let mut touched: Vec<&str> = Vec::new();
            for target in refs {
                if let Some(documents) = state.collections.get_mut(&target.collection) {
                    documents.retain(|doc| document_id(doc) != Some(target.id.as_str()));
                }
                if !touched.contains(&target.collection.as_str()) {
                    touched.push(&target.collection);
                }
            }
            touched
                .into_iter()
                .flat_map(|collection| state.deliveries(collection))
                .collect::<Vec<_>>()
        };
        deliver(deliveries);
        Ok(())
    }
}
