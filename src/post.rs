//! Post - Record Types
//!
//! Explicit record shape, validated once at the parse boundary.
//!
//! - [`Post`]: the full record as stored
//! - [`PostSummary`]: listing projection, exactly `{id, title, date, author}`
//! - [`PostPath`]: `{params: {id}}` wrapper for static page generation
//! - [`PostLookup`]: a found record or the not-found placeholder

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::NOT_FOUND_TEXT;

const FIELD_DATE: &str = "date";
const FIELD_AUTHOR: &str = "author";
const FIELD_CONTENT_HTML: &str = "contentHtml";

// =============================================================================
// RecordId
// =============================================================================

/// Stored identifier of a post.
///
/// Keeps the JSON scalar as stored (string, number or boolean) so the full
/// record round-trips unchanged; [`RecordId::as_key`] gives the string form
/// used for comparison and listing output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordId(Value);

impl RecordId {
    /// Wrap a JSON scalar. Returns `None` for null, arrays and objects.
    #[must_use]
    pub fn new(value: Value) -> Option<Self> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(Self(value)),
            _ => None,
        }
    }

    /// The stored JSON value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// String coercion, matching how a JavaScript `String(x)` renders it.
    #[must_use]
    pub fn as_key(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            Value::Number(n) => number_key(n),
            other => other.to_string(),
        }
    }
}

/// Number formatting of JavaScript `String(x)`: integral floats drop the
/// fraction (`2.0` -> `"2"`), negative zero is `"0"`, and magnitudes outside
/// `[1e-6, 1e21)` use exponent form with a signed exponent (`"1e+21"`).
fn number_key(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{f}");
    }
    let exp = format!("{f:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(Value::String(s))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        Self(Value::from(n))
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self(Value::from(n))
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(Value::from(n))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::new(value).ok_or_else(|| {
            serde::de::Error::custom("`id` must be a string, number or boolean")
        })
    }
}

// =============================================================================
// Post
// =============================================================================

/// A full post record.
///
/// Only `id` and `title` are typed; every other stored field stays in
/// `extra` exactly as stored, including nulls and non-string values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Identifier as stored
    pub id: RecordId,
    /// Title, the listing sort key
    pub title: String,
    /// Every other stored field, verbatim and in stored order
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    /// Create a post with only the required fields.
    #[must_use]
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }

    /// Set a stored field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Set the date.
    #[must_use]
    pub fn with_date(self, date: impl Into<String>) -> Self {
        self.with_field(FIELD_DATE, date.into())
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(self, author: impl Into<String>) -> Self {
        self.with_field(FIELD_AUTHOR, author.into())
    }

    /// Set the rendered body.
    #[must_use]
    pub fn with_content_html(self, html: impl Into<String>) -> Self {
        self.with_field(FIELD_CONTENT_HTML, html.into())
    }

    /// Validate and convert one raw record.
    ///
    /// `record` names the record in the error (array index or document key).
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidRecord`] if the value is not an object or
    /// lacks a scalar `id` or a string `title`. Other fields are not checked.
    pub fn from_value(value: Value, record: &str) -> StoreResult<Self> {
        if !value.is_object() {
            return Err(StoreError::invalid_record(record, "record is not an object"));
        }
        serde_json::from_value(value).map_err(|e| StoreError::invalid_record(record, e.to_string()))
    }

    /// String form of the identifier.
    #[must_use]
    pub fn key(&self) -> String {
        self.id.as_key()
    }

    /// A stored field, if present and a string.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Date text, when stored as a string.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.text(FIELD_DATE)
    }

    /// Author, when stored as a string.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.text(FIELD_AUTHOR)
    }

    /// Rendered body, when stored as a string.
    #[must_use]
    pub fn content_html(&self) -> Option<&str> {
        self.text(FIELD_CONTENT_HTML)
    }

    /// Project down to the listing shape. A `date` or `author` that is
    /// absent or not a string is left out.
    #[must_use]
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.key(),
            title: self.title.clone(),
            date: self.date().map(str::to_string),
            author: self.author().map(str::to_string),
        }
    }

    /// Identifier wrapper for static page generation.
    #[must_use]
    pub fn path(&self) -> PostPath {
        PostPath::new(self.key())
    }
}

// =============================================================================
// Projections
// =============================================================================

/// Listing projection of a post. Never carries any other field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostSummary {
    /// Identifier, coerced to a string
    pub id: String,
    /// Title
    pub title: String,
    /// Free-form date text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Route parameters for one post page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParams {
    /// Identifier, coerced to a string
    pub id: String,
}

/// `{params: {id}}` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPath {
    /// Route parameters
    pub params: PathParams,
}

impl PostPath {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            params: PathParams { id: id.into() },
        }
    }

    /// The wrapped identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.params.id
    }
}

// =============================================================================
// Lookup
// =============================================================================

/// Placeholder returned when no record matches.
///
/// Serializes as `{id, title: "Not found", date: "", contentHtml: "Not found"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundPost {
    /// The requested identifier
    pub id: String,
    /// Always "Not found"
    pub title: String,
    /// Always empty
    pub date: String,
    /// Always "Not found"
    #[serde(rename = "contentHtml")]
    pub content_html: String,
}

impl NotFoundPost {
    /// Placeholder for the requested id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: NOT_FOUND_TEXT.to_string(),
            date: String::new(),
            content_html: NOT_FOUND_TEXT.to_string(),
        }
    }
}

/// Outcome of a single-post lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PostLookup {
    /// The full record as stored
    Found(Post),
    /// No record matched
    NotFound(NotFoundPost),
}

impl PostLookup {
    /// Placeholder for a missing id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(NotFoundPost::new(id))
    }

    /// Whether a record matched.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The matched record, if any.
    #[must_use]
    pub fn post(&self) -> Option<&Post> {
        match self {
            Self::Found(post) => Some(post),
            Self::NotFound(_) => None,
        }
    }

    /// Consume into the matched record, if any.
    #[must_use]
    pub fn into_post(self) -> Option<Post> {
        match self {
            Self::Found(post) => Some(post),
            Self::NotFound(_) => None,
        }
    }

    /// Title of the record or the placeholder.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Found(post) => &post.title,
            Self::NotFound(placeholder) => &placeholder.title,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
