//! LocalFileStore - JSON File Backend
//!
//! Reads `<data_dir>/posts.json` afresh on every call. The file must hold a
//! JSON array of post records.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::{sorted_summaries, PostStore};
use crate::error::{StoreError, StoreResult};
use crate::post::{Post, PostLookup, PostPath, PostSummary};
use crate::POSTS_FILE_NAME;

/// Post store over a local JSON file.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    /// Store over `posts.json` inside `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::from_file(data_dir.as_ref().join(POSTS_FILE_NAME))
    }

    /// Store over an explicit file.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file read on every call.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, parse and validate the whole file. No caching.
    async fn load(&self) -> StoreResult<Vec<Post>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        let records: Vec<Value> =
            serde_json::from_str(&text).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Post::from_value(record, &index.to_string()))
            .collect()
    }
}

#[async_trait]
impl PostStore for LocalFileStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list_sorted(&self) -> StoreResult<Vec<PostSummary>> {
        let posts = self.load().await?;
        tracing::debug!(backend = self.name(), count = posts.len(), "listing sorted posts");
        Ok(sorted_summaries(posts))
    }

    async fn list_identifiers(&self) -> StoreResult<Vec<PostPath>> {
        let posts = self.load().await?;
        tracing::debug!(backend = self.name(), count = posts.len(), "listing post identifiers");
        Ok(posts.iter().map(Post::path).collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<PostLookup> {
        let posts = self.load().await?;
        let found = posts.into_iter().find(|post| post.key() == id);
        tracing::debug!(backend = self.name(), id, found = found.is_some(), "looked up post");

        Ok(match found {
            Some(post) => PostLookup::Found(post),
            None => PostLookup::not_found(id),
        })
    }
}
