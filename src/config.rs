//! Configuration
//!
//! Backend selection and Firebase connection parameters, read from the
//! process environment (or any key lookup, for tests).

use std::path::PathBuf;

use crate::error::{StoreError, StoreResult};
use crate::{DATA_DIR_DEFAULT, POSTS_COLLECTION_DEFAULT};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Backend selector: `local` or `firestore`
pub const ENV_BACKEND: &str = "POSTSHELF_BACKEND";

/// Data directory for the local backend
pub const ENV_DATA_DIR: &str = "POSTSHELF_DATA_DIR";

/// Collection name for the remote backend
pub const ENV_COLLECTION: &str = "POSTSHELF_COLLECTION";

/// Firestore emulator `host:port`
pub const ENV_EMULATOR_HOST: &str = "FIRESTORE_EMULATOR_HOST";

/// Firebase web API key
pub const ENV_API_KEY: &str = "FIREBASE_APIKEY";

/// Firebase auth domain
pub const ENV_AUTH_DOMAIN: &str = "FIREBASE_AUTHDOMAIN";

/// Firebase project identifier
pub const ENV_PROJECT_ID: &str = "FIREBASE_PROJECTID";

/// Firebase storage bucket
pub const ENV_STORAGE_BUCKET: &str = "FIREBASE_STORAGEBUCKET";

/// Firebase messaging sender id
pub const ENV_MESSAGING_SENDER_ID: &str = "FIREBASE_MESSAGINGSENDERID";

/// Firebase app id
pub const ENV_APP_ID: &str = "FIREBASE_APPID";

/// Firebase analytics measurement id
pub const ENV_MEASUREMENT_ID: &str = "FIREBASE_MEASUREMENTID";

// =============================================================================
// Types
// =============================================================================

/// Which backend serves the queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    /// JSON file under the data directory
    Local,
    /// Cloud Firestore
    Firestore,
}

impl BackendKind {
    /// Get string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Firestore => "firestore",
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" | "json" => Some(Self::Local),
            "firestore" | "firebase" | "remote" => Some(Self::Firestore),
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Firebase web-app connection parameters.
///
/// Only `api_key` and `project_id` are needed to read Firestore over REST;
/// the rest are carried for completeness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    /// Web API key
    pub api_key: String,
    /// Project identifier
    pub project_id: String,
    /// Auth domain
    pub auth_domain: Option<String>,
    /// Storage bucket
    pub storage_bucket: Option<String>,
    /// Messaging sender id
    pub messaging_sender_id: Option<String>,
    /// App id
    pub app_id: Option<String>,
    /// Analytics measurement id
    pub measurement_id: Option<String>,
    /// Emulator `host:port`, overrides the production endpoint
    pub emulator_host: Option<String>,
}

impl FirebaseConfig {
    /// Config with only the required parameters.
    #[must_use]
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_domain: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            measurement_id: None,
            emulator_host: None,
        }
    }

    /// Point at a Firestore emulator.
    #[must_use]
    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    /// Read from the process environment.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if a required variable is missing.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if a required variable is missing.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| StoreError::config(format!("{key} is not set")))
        };

        Ok(Self {
            api_key: require(ENV_API_KEY)?,
            project_id: require(ENV_PROJECT_ID)?,
            auth_domain: get(ENV_AUTH_DOMAIN),
            storage_bucket: get(ENV_STORAGE_BUCKET),
            messaging_sender_id: get(ENV_MESSAGING_SENDER_ID),
            app_id: get(ENV_APP_ID),
            measurement_id: get(ENV_MEASUREMENT_ID),
            emulator_host: get(ENV_EMULATOR_HOST),
        })
    }
}

/// Backend-specific settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Local JSON file
    Local {
        /// Directory holding `posts.json`
        data_dir: PathBuf,
    },
    /// Cloud Firestore
    Firestore {
        /// Connection parameters
        firebase: FirebaseConfig,
        /// Collection holding the posts
        collection: String,
    },
}

/// Everything needed to open a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Selected backend and its settings
    pub backend: BackendConfig,
}

impl StoreConfig {
    /// Local backend over `data_dir`.
    #[must_use]
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendConfig::Local {
                data_dir: data_dir.into(),
            },
        }
    }

    /// Firestore backend over the default collection.
    #[must_use]
    pub fn firestore(firebase: FirebaseConfig) -> Self {
        Self {
            backend: BackendConfig::Firestore {
                firebase,
                collection: POSTS_COLLECTION_DEFAULT.to_string(),
            },
        }
    }

    /// The selected backend kind.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self.backend {
            BackendConfig::Local { .. } => BackendKind::Local,
            BackendConfig::Firestore { .. } => BackendKind::Firestore,
        }
    }

    /// Read from the process environment.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] for an unknown backend name or missing
    /// Firebase parameters.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] for an unknown backend name or missing
    /// Firebase parameters.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = match lookup(ENV_BACKEND) {
            Some(name) if !name.trim().is_empty() => BackendKind::parse(&name)
                .ok_or_else(|| StoreError::config(format!("unknown backend: {name}")))?,
            _ => BackendKind::Local,
        };
        Self::for_kind(kind, lookup)
    }

    /// Build the config for an explicitly chosen backend.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if Firebase parameters are missing.
    pub fn for_kind<F>(kind: BackendKind, lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match kind {
            BackendKind::Local => {
                let raw = lookup(ENV_DATA_DIR).unwrap_or_else(|| DATA_DIR_DEFAULT.to_string());
                Ok(Self::local(expand_path(&raw)))
            }
            BackendKind::Firestore => {
                let firebase = FirebaseConfig::from_lookup(&lookup)?;
                let collection = lookup(ENV_COLLECTION)
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| POSTS_COLLECTION_DEFAULT.to_string());
                Ok(Self {
                    backend: BackendConfig::Firestore {
                        firebase,
                        collection,
                    },
                })
            }
        }
    }

    /// Replace the local data directory.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] for a Firestore config, which has no
    /// data directory.
    pub fn with_data_dir(mut self, dir: &str) -> StoreResult<Self> {
        match &mut self.backend {
            BackendConfig::Local { data_dir } => {
                *data_dir = expand_path(dir);
                Ok(self)
            }
            BackendConfig::Firestore { .. } => Err(StoreError::config(format!(
                "a data directory ({dir}) only applies to the local backend"
            ))),
        }
    }
}

/// Expand `~` and environment references in a path.
fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_is_local_data_dir() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.kind(), BackendKind::Local);
        assert_eq!(config, StoreConfig::local(DATA_DIR_DEFAULT));
    }

    #[test]
    fn test_local_data_dir_override() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[(ENV_DATA_DIR, "/srv/blog/data")])).unwrap();
        assert_eq!(config, StoreConfig::local("/srv/blog/data"));
    }

    #[test]
    fn test_firestore_from_lookup() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_BACKEND, "firestore"),
            (ENV_API_KEY, "key-123"),
            (ENV_PROJECT_ID, "blog-prod"),
            (ENV_APP_ID, "1:2:web:3"),
        ]))
        .unwrap();

        match config.backend {
            BackendConfig::Firestore {
                firebase,
                collection,
            } => {
                assert_eq!(firebase.api_key, "key-123");
                assert_eq!(firebase.project_id, "blog-prod");
                assert_eq!(firebase.app_id.as_deref(), Some("1:2:web:3"));
                assert!(firebase.measurement_id.is_none());
                assert_eq!(collection, POSTS_COLLECTION_DEFAULT);
            }
            other => panic!("expected firestore, got {other:?}"),
        }
    }

    #[test]
    fn test_firestore_missing_project_is_config_error() {
        let err = StoreConfig::from_lookup(lookup_from(&[
            (ENV_BACKEND, "firestore"),
            (ENV_API_KEY, "key-123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(ref msg) if msg.contains(ENV_PROJECT_ID)));
    }

    #[test]
    fn test_blank_required_value_is_missing() {
        let err = FirebaseConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "  "),
            (ENV_PROJECT_ID, "p"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_unknown_backend() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_BACKEND, "mongo")])).unwrap_err();
        assert!(err.to_string().contains("mongo"));
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(BackendKind::parse("LOCAL"), Some(BackendKind::Local));
        assert_eq!(BackendKind::parse("firebase"), Some(BackendKind::Firestore));
        assert_eq!(BackendKind::parse("sqlite"), None);
    }

    #[test]
    fn test_with_data_dir_rejected_for_firestore() {
        let err = StoreConfig::firestore(FirebaseConfig::new("k", "p"))
            .with_data_dir("/tmp")
            .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)), "got {err:?}");
        assert!(err.to_string().contains("local backend"));
    }
}
