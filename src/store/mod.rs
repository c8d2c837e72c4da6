//! Store - PostStore Trait and Backends
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PostStore Trait                         │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │ LocalFileStore  │           │   RemoteStore   │
//! │  (JSON file)    │           │ (DocumentClient)│
//! └─────────────────┘           └─────────────────┘
//! ```
//!
//! Both backends are read-only and stateless between calls apart from the
//! remote backend's shared client.

mod local;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;

use crate::collation::locale_compare;
use crate::config::{BackendConfig, StoreConfig};
use crate::error::StoreResult;
use crate::firestore::FirestoreClient;
use crate::post::{Post, PostLookup, PostPath, PostSummary};

pub use local::LocalFileStore;
pub use remote::RemoteStore;

// =============================================================================
// PostStore
// =============================================================================

/// The three-query contract every backend implements.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Every post projected to `{id, title, date, author}`, ascending by
    /// title under locale-aware comparison.
    async fn list_sorted(&self) -> StoreResult<Vec<PostSummary>>;

    /// One `{params: {id}}` wrapper per post.
    async fn list_identifiers(&self) -> StoreResult<Vec<PostPath>>;

    /// The full record whose string id equals `id`, or the not-found
    /// placeholder. First match wins on duplicates.
    async fn get_by_id(&self, id: &str) -> StoreResult<PostLookup>;
}

/// Open the backend selected by `config`.
///
/// # Errors
/// Returns [`StoreError::Config`](crate::StoreError::Config) if the remote
/// client cannot be built.
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn PostStore>> {
    let store: Arc<dyn PostStore> = match &config.backend {
        BackendConfig::Local { data_dir } => Arc::new(LocalFileStore::new(data_dir)),
        BackendConfig::Firestore {
            firebase,
            collection,
        } => {
            let client = FirestoreClient::new(firebase.clone())?;
            Arc::new(RemoteStore::new(Arc::new(client)).with_collection(collection))
        }
    };

    tracing::info!(backend = store.name(), "post store opened");
    Ok(store)
}

// =============================================================================
// Shared Query Helpers
// =============================================================================

/// Sort by title and project to summaries. Stable, so equal titles keep
/// their source order.
pub(crate) fn sorted_summaries(mut posts: Vec<Post>) -> Vec<PostSummary> {
    posts.sort_by(|a, b| locale_compare(&a.title, &b.title));
    posts.iter().map(Post::summary).collect()
}
