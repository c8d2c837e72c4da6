//! RemoteStore - Document Database Backend
//!
//! Answers the three queries from a collection behind a shared
//! [`DocumentClient`]. The client is built once and injected.

use std::sync::Arc;

use async_trait::async_trait;

use super::{sorted_summaries, PostStore};
use crate::error::StoreResult;
use crate::firestore::{Document, DocumentClient};
use crate::post::{Post, PostLookup, PostPath, PostSummary};
use crate::POSTS_COLLECTION_DEFAULT;

/// Post store over a document collection.
#[derive(Clone)]
pub struct RemoteStore {
    client: Arc<dyn DocumentClient>,
    collection: String,
}

impl RemoteStore {
    /// Store over the default `posts` collection.
    #[must_use]
    pub fn new(client: Arc<dyn DocumentClient>) -> Self {
        Self {
            client,
            collection: POSTS_COLLECTION_DEFAULT.to_string(),
        }
    }

    /// Use another collection.
    ///
    /// # Panics
    /// Panics if `collection` is empty.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        assert!(!collection.is_empty(), "collection cannot be empty");
        self.collection = collection;
        self
    }

    /// The collection queried.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn fetch_posts(&self) -> StoreResult<Vec<Post>> {
        self.client
            .list_documents(&self.collection)
            .await?
            .into_iter()
            .map(Document::into_post)
            .collect()
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("client", &self.client.name())
            .field("collection", &self.collection)
            .finish()
    }
}

/// A key that cannot name a document never matches.
fn is_document_key(id: &str) -> bool {
    !id.is_empty() && !id.contains('/')
}

#[async_trait]
impl PostStore for RemoteStore {
    fn name(&self) -> &'static str {
        self.client.name()
    }

    async fn list_sorted(&self) -> StoreResult<Vec<PostSummary>> {
        let posts = self.fetch_posts().await?;
        tracing::debug!(
            backend = self.name(),
            collection = %self.collection,
            count = posts.len(),
            "listing sorted posts"
        );
        Ok(sorted_summaries(posts))
    }

    /// Only the document keys are needed, so bodies are not validated.
    async fn list_identifiers(&self) -> StoreResult<Vec<PostPath>> {
        let documents = self.client.list_documents(&self.collection).await?;
        tracing::debug!(
            backend = self.name(),
            collection = %self.collection,
            count = documents.len(),
            "listing post identifiers"
        );
        Ok(documents.into_iter().map(|doc| PostPath::new(doc.id)).collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<PostLookup> {
        if !is_document_key(id) {
            tracing::debug!(backend = self.name(), id, "id cannot name a document");
            return Ok(PostLookup::not_found(id));
        }

        let mut matches = self.client.query_by_id(&self.collection, id).await?;
        if matches.len() > 1 {
            tracing::warn!(
                backend = self.name(),
                id,
                count = matches.len(),
                "multiple documents matched id, using first"
            );
        }
        tracing::debug!(backend = self.name(), id, found = !matches.is_empty(), "looked up post");

        if matches.is_empty() {
            return Ok(PostLookup::not_found(id));
        }
        Ok(PostLookup::Found(matches.swap_remove(0).into_post()?))
    }
}
