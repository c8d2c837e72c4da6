//! SimDocumentClient - In-Memory Document Client
//!
//! Deterministic stand-in for Firestore in tests and offline runs.
//! Documents keep insertion order; a configured failure makes every
//! call fail, to exercise error propagation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Document, DocumentClient};
use crate::error::{StoreError, StoreResult};

/// In-memory document client.
#[derive(Debug, Default)]
pub struct SimDocumentClient {
    /// Documents by collection, in insertion order
    collections: RwLock<HashMap<String, Vec<Document>>>,
    /// When set, every call fails with this message
    failure: RwLock<Option<String>>,
    /// Calls served (including failed ones)
    calls: AtomicUsize,
}

impl SimDocumentClient {
    /// Create an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. `fields` must be a JSON object.
    ///
    /// # Panics
    /// Panics if `fields` is not an object.
    #[must_use]
    pub fn with_document(mut self, collection: &str, id: &str, fields: Value) -> Self {
        let Value::Object(fields) = fields else {
            panic!("document fields must be an object, got {fields}");
        };
        self.collections
            .get_mut()
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id, fields));
        self
    }

    /// Fail every call with `message`.
    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        *self.failure.get_mut() = Some(message.to_string());
        self
    }

    /// Add a document after construction.
    pub async fn insert(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Set or clear the failure mode.
    pub async fn set_failure(&self, message: Option<&str>) {
        *self.failure.write().await = message.map(str::to_string);
    }

    /// Number of calls served so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn check(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.read().await.as_deref() {
            Some(message) => Err(StoreError::Unavailable(message.to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentClient for SimDocumentClient {
    fn name(&self) -> &'static str {
        "sim"
    }

    async fn list_documents(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.check().await?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn query_by_id(&self, collection: &str, id: &str) -> StoreResult<Vec<Document>> {
        self.check().await?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.iter().filter(|d| d.id == id).cloned().collect())
            .unwrap_or_default())
    }
}
