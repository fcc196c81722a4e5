//! Request metadata assembled from generated endpoint arguments.
//!
//! [`RequestMetadata`] is where the parameter helpers and the encoder meet:
//! optional query and header arguments are compacted into it, the body is
//! encoded into it, and it can then be handed to `reqwest` as a ready
//! [`reqwest::RequestBuilder`]. Sending the request, retrying it, and reading
//! the response are left to the caller.

use crate::encode::{Encoder, JsonEncodable};
use crate::params::{append_query_items, compact_header_mapping, header_map, to_query_items, QueryItem};
use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;
use url::Url;

/// Metadata for an individual HTTP request.
///
/// This type contains everything needed to issue a single HTTP request:
/// method, path, headers, ordered query items and an encoded JSON body.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use restmarshal::{metadata::RequestMetadata, CalendarDate, Encoder};
/// use serde_json::json;
///
/// let encoder = Encoder::new();
/// let metadata = RequestMetadata::new(Method::POST, "/v1/bookings")
///     .with_query([("dryRun", Some(json!(true))), ("note", None)])
///     .with_headers([("X-Request-Id", Some(json!("abc-123")))])?
///     .with_json_body(&encoder, &CalendarDate::new(2024, 7, 1))?;
///
/// assert_eq!(metadata.query.len(), 1);
/// assert_eq!(metadata.body, Some(json!("2024-07-01")));
///
/// let base = url::Url::parse("https://api.example.com")?;
/// assert_eq!(
///     metadata.url(&base).as_str(),
///     "https://api.example.com/v1/bookings?dryRun=true"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path (relative to the base URL).
    pub path: String,

    /// Headers for this request.
    pub headers: HeaderMap,

    /// Query items for this request, in the order they will be sent.
    pub query: Vec<QueryItem>,

    /// The encoded JSON body, if any.
    pub body: Option<Value>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::InvalidHeader(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::InvalidHeader(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds every present entry of an optional header mapping.
    ///
    /// Absent entries are skipped and the rest are stringified.
    ///
    /// # Errors
    ///
    /// Returns an error if any header name or value is invalid.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let compacted = compact_header_mapping(headers);
        self.headers.extend(header_map(&compacted)?);
        Ok(self)
    }

    /// Adds a single query item to the request.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(QueryItem::new(name, value));
        self
    }

    /// Adds every present entry of an optional parameter mapping as query
    /// items, expanding string arrays into repeated items.
    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if let Some(items) = to_query_items(params) {
            self.query.extend(items);
        }
        self
    }

    /// Encodes `body` with `encoder` and stores it as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded.
    pub fn with_json_body<T>(mut self, encoder: &Encoder, body: &T) -> Result<Self>
    where
        T: JsonEncodable + ?Sized,
    {
        self.body = Some(encoder.encode(body)?);
        Ok(self)
    }

    /// Builds the full URL for this request against `base_url`.
    pub fn url(&self, base_url: &Url) -> Url {
        let mut url = base_url.clone();
        url.set_path(&self.path);
        append_query_items(&mut url, &self.query);
        url
    }

    /// Turns this metadata into a `reqwest` request ready to be sent.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn into_request(
        self,
        client: &reqwest::Client,
        base_url: impl AsRef<str>,
    ) -> Result<reqwest::RequestBuilder> {
        let base_url = Url::parse(base_url.as_ref())?;
        let url = self.url(&base_url);

        tracing::debug!(
            method = %self.method,
            url = %url,
            headers = self.headers.len(),
            has_body = self.body.is_some(),
            "Prepared HTTP request"
        );

        let mut request = client.request(self.method, url).headers(self.headers);

        if let Some(body) = &self.body {
            request = request.json(body);
        }

        Ok(request)
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}
