//! Firestore - Document Client Trait and Implementations
//!
//! All remote I/O goes through the injectable [`DocumentClient`] seam.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   DocumentClient Trait                       │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴─────────┐          ┌────────┴────────┐
//! │SimDocumentClient │          │ FirestoreClient │
//! │   (testing)      │          │  (production)   │
//! └──────────────────┘          └─────────────────┘
//! ```

mod client;
mod sim;
pub mod value;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;
use crate::post::Post;

pub use client::{FirestoreClient, FIRESTORE_BASE_URL, FIRESTORE_PAGE_SIZE};
pub use sim::SimDocumentClient;

// =============================================================================
// Document
// =============================================================================

/// A decoded document: its key plus plain-JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document key (last segment of the resource name)
    pub id: String,
    /// Field values, decoded from Firestore's typed encoding
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Convert to a validated post. The document key becomes the post id,
    /// replacing any `id` field stored in the body.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidRecord`](crate::StoreError::InvalidRecord)
    /// if the fields do not form a valid post.
    pub fn into_post(self) -> StoreResult<Post> {
        let Self { id, mut fields } = self;
        fields.insert("id".to_string(), Value::String(id.clone()));
        Post::from_value(Value::Object(fields), &id)
    }
}

// =============================================================================
// DocumentClient
// =============================================================================

/// Read access to a document database.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Every document in a collection, in store order.
    async fn list_documents(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Documents whose key equals `id`, in store order.
    async fn query_by_id(&self, collection: &str, id: &str) -> StoreResult<Vec<Document>>;
}
