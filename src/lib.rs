//! Postshelf - Read-Only Blog Post Data Access
//!
//! Fetches post records from a local JSON file or from Cloud Firestore,
//! normalizes them into one shape, and answers three queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PostStore Trait                         │
//! │   list_sorted · list_identifiers · get_by_id                 │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │ LocalFileStore  │           │   RemoteStore   │
//! │ data/posts.json │           │ DocumentClient  │
//! └─────────────────┘           └────────┬────────┘
//!                                        │
//!                         ┌──────────────┴──────────────┐
//!                         │                             │
//!                 ┌───────┴────────┐          ┌─────────┴────────┐
//!                 │FirestoreClient │          │SimDocumentClient │
//!                 │ (production)   │          │   (testing)      │
//!                 └────────────────┘          └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use postshelf::{open_store, PostStore, StoreConfig};
//!
//! # async fn run() -> postshelf::StoreResult<()> {
//! let store = open_store(&StoreConfig::from_env()?)?;
//! for post in store.list_sorted().await? {
//!     println!("{} {}", post.id, post.title);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collation;
pub mod config;
pub mod error;
pub mod firestore;
pub mod post;
pub mod store;

// =============================================================================
// Constants
// =============================================================================

/// Default directory holding the local posts file
pub const DATA_DIR_DEFAULT: &str = "data";

/// File name of the local posts file inside the data directory
pub const POSTS_FILE_NAME: &str = "posts.json";

/// Default remote collection name
pub const POSTS_COLLECTION_DEFAULT: &str = "posts";

/// Title and content of the not-found placeholder
pub const NOT_FOUND_TEXT: &str = "Not found";

// Re-export common types
pub use collation::locale_compare;
pub use config::{BackendConfig, BackendKind, FirebaseConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use firestore::{Document, DocumentClient, FirestoreClient, SimDocumentClient};
pub use post::{NotFoundPost, PathParams, Post, PostLookup, PostPath, PostSummary, RecordId};
pub use store::{open_store, LocalFileStore, PostStore, RemoteStore};
