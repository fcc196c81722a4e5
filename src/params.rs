//! Helpers that shape optional request arguments into query strings and
//! header maps.
//!
//! Generated endpoint functions collect their optional arguments into an
//! insertion-ordered mapping of `Option` values. The helpers here drop the
//! absent entries and render what remains as strings, keeping the caller's
//! order so the resulting URLs are stable.
//!
//! # Examples
//!
//! ```
//! use restmarshal::params::{to_query_items, QueryItem};
//! use serde_json::json;
//!
//! let items = to_query_items([
//!     ("tags", Some(json!(["x", "y"]))),
//!     ("q", None),
//!     ("limit", Some(json!(5))),
//! ])
//! .unwrap();
//!
//! assert_eq!(
//!     items,
//!     vec![
//!         QueryItem::new("tags", "x"),
//!         QueryItem::new("tags", "y"),
//!         QueryItem::new("limit", "5"),
//!     ]
//! );
//! ```

use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::ser::SerializeTuple;
use serde_json::Value;
use std::fmt;
use url::Url;

/// An insertion-ordered mapping of parameter names to present values.
pub type Parameters = IndexMap<String, Value>;

/// A single `name=value` pair destined for a URL query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryItem {
    /// The parameter name.
    pub name: String,
    /// The parameter value, not yet percent-encoded.
    pub value: String,
}

impl QueryItem {
    /// Creates a query item.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for QueryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for QueryItem {
    fn from((name, value): (K, V)) -> Self {
        Self::new(name, value)
    }
}

// Serialized as a `(name, value)` pair so a `Vec<QueryItem>` can be handed
// straight to form/query serializers.
impl serde::Serialize for QueryItem {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.name)?;
        pair.serialize_element(&self.value)?;
        pair.end()
    }
}

/// Renders a parameter value the way it appears in a query string or header.
///
/// Strings are used as-is (no quotes), numbers and booleans use their usual
/// decimal/`true`/`false` forms, `null` becomes `"null"`, and arrays or
/// objects fall back to compact JSON.
///
/// # Examples
///
/// ```
/// use restmarshal::params::param_to_string;
/// use serde_json::json;
///
/// assert_eq!(param_to_string(&json!("plain")), "plain");
/// assert_eq!(param_to_string(&json!(2.5)), "2.5");
/// assert_eq!(param_to_string(&json!(false)), "false");
/// assert_eq!(param_to_string(&json!([1, 2])), "[1,2]");
/// ```
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Drops absent entries from `source`.
///
/// Returns `None` rather than an empty mapping when nothing is left, so the
/// caller can omit the whole parameter block.
///
/// # Examples
///
/// ```
/// use restmarshal::params::compact_mapping;
/// use serde_json::{json, Value};
///
/// let compacted = compact_mapping([("a", Some(json!(1))), ("b", None)]).unwrap();
/// assert_eq!(compacted.len(), 1);
/// assert_eq!(compacted["a"], json!(1));
///
/// assert!(compact_mapping([("a", None::<Value>)]).is_none());
/// ```
pub fn compact_mapping<I, K, V>(source: I) -> Option<Parameters>
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: Into<String>,
    V: Into<Value>,
{
    let mut dropped = 0usize;
    let compacted: Parameters = source
        .into_iter()
        .filter_map(|(name, value)| match value {
            Some(value) => Some((name.into(), value.into())),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();

    tracing::trace!(
        kept = compacted.len(),
        dropped = dropped,
        "Compacted parameter mapping"
    );

    if compacted.is_empty() {
        None
    } else {
        Some(compacted)
    }
}

/// Drops absent entries and renders the rest as header strings.
///
/// Unlike [`compact_mapping`], the result is always a mapping, possibly
/// empty.
///
/// # Examples
///
/// ```
/// use restmarshal::params::compact_header_mapping;
/// use serde_json::json;
///
/// let headers = compact_header_mapping([
///     ("X-Request-Id", Some(json!("abc"))),
///     ("X-Retry", Some(json!(2))),
///     ("X-Trace", None),
/// ]);
///
/// assert_eq!(headers["X-Request-Id"], "abc");
/// assert_eq!(headers["X-Retry"], "2");
/// assert!(!headers.contains_key("X-Trace"));
/// ```
pub fn compact_header_mapping<I, K, V>(source: I) -> IndexMap<String, String>
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: Into<String>,
    V: Into<Value>,
{
    source
        .into_iter()
        .filter_map(|(name, value)| {
            let value: Value = value?.into();
            Some((name.into(), param_to_string(&value)))
        })
        .collect()
}

/// Replaces boolean values with the strings `"true"` and `"false"`.
///
/// Every other entry passes through untouched, including its type.
///
/// # Examples
///
/// ```
/// use restmarshal::params::{normalize_booleans, Parameters};
/// use serde_json::json;
///
/// let mut params = Parameters::new();
/// params.insert("flag".to_string(), json!(true));
/// params.insert("n".to_string(), json!(5));
///
/// let normalized = normalize_booleans(Some(params)).unwrap();
/// assert_eq!(normalized["flag"], json!("true"));
/// assert_eq!(normalized["n"], json!(5));
///
/// assert!(normalize_booleans(None).is_none());
/// ```
pub fn normalize_booleans(source: Option<Parameters>) -> Option<Parameters> {
    let params = source?;
    Some(
        params
            .into_iter()
            .map(|(name, value)| match value {
                Value::Bool(b) => (name, Value::String(b.to_string())),
                other => (name, other),
            })
            .collect(),
    )
}

/// Flattens optional parameters into ordered query items.
///
/// Absent entries are skipped. An array made up entirely of strings yields
/// one item per element under the same name; any other value yields a single
/// item rendered with [`param_to_string`]. Items come out in input order.
/// Returns `None` if no items were produced.
pub fn to_query_items<I, K, V>(values: I) -> Option<Vec<QueryItem>>
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: Into<String>,
    V: Into<Value>,
{
    let mut items = Vec::new();

    for (name, value) in values {
        let Some(value) = value else {
            continue;
        };
        let name: String = name.into();
        let value: Value = value.into();

        match value {
            Value::Array(elements) if elements.iter().all(Value::is_string) => {
                items.extend(
                    elements
                        .into_iter()
                        .filter_map(|element| match element {
                            Value::String(s) => Some(QueryItem::new(name.clone(), s)),
                            _ => None,
                        }),
                );
            }
            other => items.push(QueryItem::new(name, param_to_string(&other))),
        }
    }

    tracing::trace!(count = items.len(), "Built query items");

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Converts a string header mapping into an [`http::HeaderMap`].
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] if any name or value is not valid HTTP.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use restmarshal::params::header_map;
///
/// let mut headers = IndexMap::new();
/// headers.insert("X-Page".to_string(), "3".to_string());
///
/// let map = header_map(&headers)?;
/// assert_eq!(map["x-page"], "3");
/// # Ok::<(), restmarshal::Error>(())
/// ```
pub fn header_map(headers: &IndexMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::InvalidHeader(format!("Invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| Error::InvalidHeader(format!("Invalid header value for {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Appends `items` to the query string of `url`, percent-encoding them.
///
/// Leaves `url` untouched when `items` is empty.
pub fn append_query_items(url: &mut Url, items: &[QueryItem]) {
    if items.is_empty() {
        return;
    }
    url.query_pairs_mut()
        .extend_pairs(items.iter().map(|item| (&item.name, &item.value)));
}
