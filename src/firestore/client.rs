//! FirestoreClient - Production Document Client
//!
//! Reads Cloud Firestore through its REST v1 API with a web API key.
//!
//! ```text
//! GET  {base}/projects/{project}/databases/(default)/documents/{collection}
//!          ?pageSize=..&pageToken=..&key=..
//! POST {base}/projects/{project}/databases/(default)/documents:runQuery?key=..
//! ```

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde_json::{json, Value};

use super::value::{decode_document, error_message, parse_list_page, parse_query_response};
use super::{Document, DocumentClient};
use crate::config::FirebaseConfig;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Production REST endpoint
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per list page
pub const FIRESTORE_PAGE_SIZE: u32 = 300;

/// Bearer token the emulator accepts as an admin credential
const EMULATOR_BEARER_TOKEN: &str = "owner";

// =============================================================================
// FirestoreClient
// =============================================================================

/// Firestore REST client.
///
/// Construct once at startup and share through an `Arc`; the inner
/// `reqwest::Client` pools connections and is safe for concurrent reads.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    config: FirebaseConfig,
    base_url: String,
}

impl FirestoreClient {
    /// Create a client for the configured project.
    ///
    /// Targets the emulator when `config.emulator_host` is set.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if the HTTP client cannot be built.
    pub fn new(config: FirebaseConfig) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::config(format!("failed to build HTTP client: {e}")))?;

        let base_url = match &config.emulator_host {
            Some(host) => format!("http://{}/v1", host.trim_end_matches('/')),
            None => FIRESTORE_BASE_URL.to_string(),
        };

        tracing::debug!(project = %config.project_id, base_url = %base_url, "firestore client created");

        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    /// Override the REST endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client (proxy or timeout settings).
    #[must_use]
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// The connection parameters.
    #[must_use]
    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    /// The REST endpoint in use.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Request building
    // -------------------------------------------------------------------------

    /// Resource path of the default database's document root.
    #[must_use]
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.config.project_id
        )
    }

    /// Full resource name of one document.
    #[must_use]
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_root())
    }

    /// URL listing a collection. Path segments are percent-encoded.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if the base URL is not a valid URL.
    pub fn collection_url(&self, collection: &str) -> StoreResult<Url> {
        let mut url = self.parse_url(&format!("{}/{}", self.base_url, self.documents_root()))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::config(format!("base URL cannot hold a path: {}", self.base_url)))?
            .push(collection);
        Ok(url)
    }

    /// URL of the `runQuery` endpoint.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if the base URL is not a valid URL.
    pub fn run_query_url(&self) -> StoreResult<Url> {
        self.parse_url(&format!("{}/{}:runQuery", self.base_url, self.documents_root()))
    }

    /// Structured query matching one document key.
    #[must_use]
    pub fn id_query_body(&self, collection: &str, id: &str) -> Value {
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "__name__" },
                        "op": "EQUAL",
                        "value": { "referenceValue": self.document_name(collection, id) }
                    }
                }
            }
        })
    }

    fn parse_url(&self, raw: &str) -> StoreResult<Url> {
        Url::parse(raw).map_err(|e| StoreError::config(format!("invalid Firestore URL {raw}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.query(&[("key", self.config.api_key.as_str())]);
        if self.config.emulator_host.is_some() {
            request.bearer_auth(EMULATOR_BEARER_TOKEN)
        } else {
            request
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> StoreResult<String> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| body.clone());
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

// =============================================================================
// DocumentClient Implementation
// =============================================================================

#[async_trait]
impl DocumentClient for FirestoreClient {
    fn name(&self) -> &'static str {
        "firestore"
    }

    /// Follows page tokens until the collection is exhausted.
    async fn list_documents(&self, collection: &str) -> StoreResult<Vec<Document>> {
        // Precondition
        assert!(!collection.is_empty(), "collection cannot be empty");

        let url = self.collection_url(collection)?;
        let page_size = FIRESTORE_PAGE_SIZE.to_string();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .query(&[("pageSize", page_size.as_str())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page = parse_list_page(&self.send(request).await?)?;
            tracing::trace!(
                collection,
                page_len = page.documents.len(),
                "fetched list page"
            );
            for raw in page.documents {
                documents.push(decode_document(raw)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn query_by_id(&self, collection: &str, id: &str) -> StoreResult<Vec<Document>> {
        // Preconditions
        assert!(!collection.is_empty(), "collection cannot be empty");
        assert!(!id.is_empty(), "id cannot be empty");

        let request = self
            .http
            .post(self.run_query_url()?)
            .json(&self.id_query_body(collection, id));

        parse_query_response(&self.send(request).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
