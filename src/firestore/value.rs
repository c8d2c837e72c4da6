//! Firestore REST wire format.
//!
//! Firestore encodes every field as a single-key object naming its type,
//! e.g. `{"integerValue": "42"}`. These helpers turn documents, list pages
//! and query results into plain JSON.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use super::Document;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Wire Types
// =============================================================================

/// A document as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Full resource name, `projects/.../documents/<collection>/<id>`
    pub name: String,
    /// Typed field values; absent for an empty document
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// One page of `documents.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    /// Documents on this page; absent when the collection is empty
    #[serde(default)]
    pub documents: Vec<RawDocument>,
    /// Token for the next page; absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One element of a `runQuery` response array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem {
    /// Matched document; absent on progress-only items
    #[serde(default)]
    pub document: Option<RawDocument>,
}

// =============================================================================
// Decoding
// =============================================================================

/// Document key from a resource name.
///
/// # Errors
/// Returns [`StoreError::Decode`] if the name has no final segment.
pub fn document_id(name: &str) -> StoreResult<String> {
    match name.rsplit('/').next() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(StoreError::decode(format!("invalid document name: {name:?}"))),
    }
}

/// Decode a raw document.
///
/// # Errors
/// Returns [`StoreError::Decode`] on a bad name or an undecodable field.
pub fn decode_document(raw: RawDocument) -> StoreResult<Document> {
    let id = document_id(&raw.name)?;
    let fields = decode_fields(&raw.fields)?;
    Ok(Document::new(id, fields))
}

/// Decode a `fields` map.
///
/// # Errors
/// Returns [`StoreError::Decode`] if any value is undecodable.
pub fn decode_fields(fields: &Map<String, Value>) -> StoreResult<Map<String, Value>> {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let decoded = decode_value(value).map_err(|e| match e {
            StoreError::Decode(msg) => StoreError::decode(format!("field `{key}`: {msg}")),
            other => other,
        })?;
        out.insert(key.clone(), decoded);
    }
    Ok(out)
}

/// Decode one typed value.
///
/// # Errors
/// Returns [`StoreError::Decode`] for an unknown kind or a malformed payload.
pub fn decode_value(value: &Value) -> StoreResult<Value> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::decode(format!("expected typed value, got {value}")))?;
    let (kind, inner) = match obj.iter().next() {
        Some(entry) if obj.len() == 1 => entry,
        _ => {
            return Err(StoreError::decode(format!(
                "expected exactly one value kind, got {value}"
            )))
        }
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed(kind, inner)),
        "integerValue" => decode_integer(inner).ok_or_else(|| malformed(kind, inner)),
        "doubleValue" => decode_double(inner).ok_or_else(|| malformed(kind, inner)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(kind, inner)),
        "geoPointValue" => {
            let point = inner.as_object().ok_or_else(|| malformed(kind, inner))?;
            let coord = |name: &str| point.get(name).cloned().unwrap_or_else(|| Value::from(0.0));
            let mut out = Map::new();
            out.insert("latitude".to_string(), coord("latitude"));
            out.insert("longitude".to_string(), coord("longitude"));
            Ok(Value::Object(out))
        }
        "mapValue" => {
            let map = inner.as_object().ok_or_else(|| malformed(kind, inner))?;
            match map.get("fields") {
                Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
                None => Ok(Value::Object(Map::new())),
                Some(_) => Err(malformed(kind, inner)),
            }
        }
        "arrayValue" => {
            let array = inner.as_object().ok_or_else(|| malformed(kind, inner))?;
            match array.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<StoreResult<Vec<_>>>()
                    .map(Value::Array),
                None => Ok(Value::Array(Vec::new())),
                Some(_) => Err(malformed(kind, inner)),
            }
        }
        other => Err(StoreError::decode(format!("unknown value kind `{other}`"))),
    }
}

/// int64 travels as a decimal string in proto3 JSON.
fn decode_integer(inner: &Value) -> Option<Value> {
    match inner {
        Value::String(s) => s.parse::<i64>().ok().map(Value::from),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(inner.clone()),
        _ => None,
    }
}

/// Non-finite doubles arrive as strings and have no JSON number form.
fn decode_double(inner: &Value) -> Option<Value> {
    match inner {
        Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        Value::String(s) => match s.as_str() {
            "NaN" | "Infinity" | "-Infinity" => Some(inner.clone()),
            _ => s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number),
        },
        _ => None,
    }
}

fn malformed(kind: &str, inner: &Value) -> StoreError {
    StoreError::decode(format!("malformed {kind}: {inner}"))
}

/// Parse a `documents.list` page body.
///
/// # Errors
/// Returns [`StoreError::Decode`] if the body is not a list page.
pub fn parse_list_page(body: &str) -> StoreResult<ListPage> {
    serde_json::from_str(body).map_err(|e| StoreError::decode(format!("list response: {e}")))
}

/// Parse a `runQuery` body into decoded documents, skipping progress items.
///
/// # Errors
/// Returns [`StoreError::Decode`] if the body is not a query result array.
pub fn parse_query_response(body: &str) -> StoreResult<Vec<Document>> {
    let items: Vec<QueryItem> = serde_json::from_str(body)
        .map_err(|e| StoreError::decode(format!("query response: {e}")))?;
    items
        .into_iter()
        .filter_map(|item| item.document)
        .map(decode_document)
        .collect()
}

/// Message from a Google API error body, if it has one.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = match &value {
        // runQuery wraps errors in an array
        Value::Array(items) => items.first()?.get("error")?,
        _ => value.get("error")?,
    };
    error.get("message")?.as_str().map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_value(&json!({"stringValue": "hi"})).unwrap(), json!("hi"));
        assert_eq!(decode_value(&json!({"integerValue": "42"})).unwrap(), json!(42));
        assert_eq!(decode_value(&json!({"doubleValue": 1.5})).unwrap(), json!(1.5));
        assert_eq!(decode_value(&json!({"booleanValue": true})).unwrap(), json!(true));
        assert_eq!(decode_value(&json!({"nullValue": null})).unwrap(), json!(null));
        assert_eq!(
            decode_value(&json!({"timestampValue": "2021-01-01T00:00:00Z"})).unwrap(),
            json!("2021-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_decode_non_finite_double() {
        assert_eq!(decode_value(&json!({"doubleValue": "NaN"})).unwrap(), json!("NaN"));
    }

    #[test]
    fn test_decode_nested() {
        let raw = json!({
            "mapValue": {
                "fields": {
                    "tags": {"arrayValue": {"values": [
                        {"stringValue": "rust"},
                        {"integerValue": "7"}
                    ]}},
                    "empty": {"arrayValue": {}},
                    "where": {"geoPointValue": {"latitude": 51.5}}
                }
            }
        });
        assert_eq!(
            decode_value(&raw).unwrap(),
            json!({
                "tags": ["rust", 7],
                "empty": [],
                "where": {"latitude": 51.5, "longitude": 0.0}
            })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_and_malformed() {
        assert!(decode_value(&json!({"vectorValue": {}})).is_err());
        assert!(decode_value(&json!({"integerValue": "forty"})).is_err());
        assert!(decode_value(&json!({"stringValue": 3})).is_err());
        assert!(decode_value(&json!("bare")).is_err());
        assert!(decode_value(&json!({})).is_err());
    }

    #[test]
    fn test_decode_fields_names_bad_field() {
        let fields = json!({"title": {"stringValue": "ok"}, "bad": {"nope": 1}});
        let err = decode_fields(fields.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("`bad`"));
    }

    #[test]
    fn test_document_id() {
        assert_eq!(
            document_id("projects/p/databases/(default)/documents/posts/abc").unwrap(),
            "abc"
        );
        assert!(document_id("projects/p/documents/posts/").is_err());
    }

    #[test]
    fn test_parse_list_page() {
        let body = json!({
            "documents": [{
                "name": "projects/p/databases/(default)/documents/posts/one",
                "fields": {"title": {"stringValue": "One"}},
                "createTime": "2021-01-01T00:00:00Z"
            }],
            "nextPageToken": "tok"
        })
        .to_string();
        let page = parse_list_page(&body).unwrap();
        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));

        let empty = parse_list_page("{}").unwrap();
        assert!(empty.documents.is_empty());
        assert!(empty.next_page_token.is_none());
    }

    #[test]
    fn test_parse_query_response_skips_progress_items() {
        let body = json!([
            {"readTime": "2021-01-01T00:00:00Z"},
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/posts/abc",
                    "fields": {"title": {"stringValue": "Found"}}
                },
                "readTime": "2021-01-01T00:00:00Z"
            }
        ])
        .to_string();
        let docs = parse_query_response(&body).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "abc");
        assert_eq!(docs[0].fields["title"], json!("Found"));
    }

    #[test]
    fn test_error_message() {
        let body = json!({"error": {"code": 403, "message": "Missing permissions"}}).to_string();
        assert_eq!(error_message(&body).as_deref(), Some("Missing permissions"));

        let wrapped = json!([{"error": {"message": "bad query"}}]).to_string();
        assert_eq!(error_message(&wrapped).as_deref(), Some("bad query"));

        assert_eq!(error_message("<html>"), None);
    }
}
