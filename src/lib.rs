//! # Restmarshal - request marshalling for generated REST clients
//!
//! Restmarshal holds the pieces a generated API client needs between "the
//! caller passed some arguments" and "an HTTP request goes out": encoding
//! values into JSON bodies, shaping optional arguments into query strings and
//! headers, and representing `format: date` fields.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use restmarshal::{CalendarDate, Encoder};
//! use restmarshal::format::{DateFormat, EncodeOptions};
//! use restmarshal::params::to_query_items;
//! use serde_json::json;
//! use std::collections::BTreeMap;
//!
//! // Encoding options are plain values; nothing is configured globally.
//! let encoder = Encoder::with_options(
//!     EncodeOptions::builder()
//!         .date_format(DateFormat::pattern("%Y-%m-%dT%H:%M:%S%:z")?)
//!         .build(),
//! );
//!
//! let mut body = BTreeMap::new();
//! body.insert("checkIn", encoder.encode(&CalendarDate::new(2024, 8, 2))?);
//! body.insert(
//!     "createdAt",
//!     encoder.encode(&Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap())?,
//! );
//!
//! assert_eq!(
//!     encoder.encode(&body)?,
//!     json!({ "checkIn": "2024-08-02", "createdAt": "2024-07-01T09:00:00+00:00" })
//! );
//!
//! // Absent optional arguments never reach the query string.
//! let query = to_query_items([("status", Some(json!(["open", "held"]))), ("cursor", None)]);
//! assert_eq!(query.map(|items| items.len()), Some(2));
//! # Ok::<(), restmarshal::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Value encoding** - [`JsonEncodable`] covers primitives, blobs, timestamps, UUIDs, calendar dates and their containers
//! - **Explicit configuration** - [`EncodeOptions`](format::EncodeOptions) is injected into each [`Encoder`], never read from global state
//! - **Calendar dates** - [`CalendarDate`] parses leniently and validates only when converted to a timestamp
//! - **Parameter helpers** - compact optional mappings, stringify booleans, and flatten query items in a stable order
//! - **Request hand-off** - [`RequestMetadata`](metadata::RequestMetadata) produces a `reqwest::RequestBuilder` without sending it
//!
//! ## Error Handling
//!
//! Operations that conceptually return "nothing" on bad input return `Option`;
//! the `Result` forms next to them explain why:
//!
//! ```
//! use restmarshal::{CalendarDate, Error};
//!
//! assert!(CalendarDate::parse("2020-01").is_none());
//!
//! match "2020-01".parse::<CalendarDate>() {
//!     Err(Error::InvalidDate { reason, .. }) => assert!(reason.contains("3")),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

mod date;
pub mod encode;
mod error;
pub mod format;
pub mod metadata;
pub mod params;

pub use date::CalendarDate;
pub use encode::{Binary, Encoder, JsonEncodable, Serialized};
pub use error::{Error, Result};
pub use params::QueryItem;
