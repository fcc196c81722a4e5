//! Conversion of request values into JSON-compatible trees.
//!
//! Any type implementing [`JsonEncodable`] can be turned into a
//! [`serde_json::Value`] by an [`Encoder`]. The encoder carries the
//! [`EncodeOptions`] that decide how timestamps and calendar dates are
//! written, so the same value can be encoded differently for different APIs.
//!
//! # Examples
//!
//! ```
//! use restmarshal::{Binary, CalendarDate, Encoder};
//! use serde_json::json;
//! use std::collections::BTreeMap;
//!
//! let encoder = Encoder::new();
//!
//! let mut body = BTreeMap::new();
//! body.insert("born", vec![CalendarDate::new(1990, 4, 1)]);
//!
//! assert_eq!(encoder.encode(&body)?, json!({ "born": ["1990-04-01"] }));
//! assert_eq!(encoder.encode(&Binary::from(&b"hi"[..]))?, json!("aGk="));
//! # Ok::<(), restmarshal::Error>(())
//! ```

use crate::format::{CalendarDateStyle, EncodeOptions};
use crate::{CalendarDate, Error, Result};
use base64::Engine;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// A value that can be converted into a JSON-compatible tree.
///
/// Implement this for your own types to let an [`Encoder`] include them in
/// request bodies.
///
/// # Examples
///
/// ```
/// use restmarshal::{Encoder, JsonEncodable, Result};
/// use serde_json::{json, Value};
///
/// struct Celsius(f64);
///
/// impl JsonEncodable for Celsius {
///     fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
///         encoder.encode(&format!("{}C", self.0))
///     }
/// }
///
/// assert_eq!(Encoder::new().encode(&Celsius(21.5))?, json!("21.5C"));
/// # Ok::<(), restmarshal::Error>(())
/// ```
pub trait JsonEncodable {
    /// Encodes `self` using the options carried by `encoder`.
    fn encode_json(&self, encoder: &Encoder) -> Result<Value>;
}

/// Encodes values into [`serde_json::Value`] trees.
///
/// Encoders are immutable and cheap to clone; build one per API
/// configuration and share it.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    /// Creates an encoder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder with the given options.
    pub fn with_options(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Returns the options this encoder was built with.
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encodes `value` into a JSON-compatible tree.
    ///
    /// # Errors
    ///
    /// Fails only for values JSON cannot represent, such as a NaN float or a
    /// timestamp outside the range of the configured date format.
    pub fn encode<T>(&self, value: &T) -> Result<Value>
    where
        T: JsonEncodable + ?Sized,
    {
        value.encode_json(self).inspect_err(|e| {
            tracing::debug!(error = %e, "Failed to encode value");
        })
    }

    /// Encodes `value` and renders it as compact JSON text.
    pub fn encode_to_string<T>(&self, value: &T) -> Result<String>
    where
        T: JsonEncodable + ?Sized,
    {
        let tree = self.encode(value)?;
        Ok(serde_json::to_string(&tree)?)
    }
}

/// An opaque binary payload, encoded as a standard base64 string.
///
/// # Examples
///
/// ```
/// use restmarshal::Binary;
///
/// let blob = Binary::from(vec![0xde, 0xad, 0xbe, 0xef]);
/// assert_eq!(blob.to_base64(), "3q2+7w==");
/// assert_eq!(Binary::from_base64("3q2+7w==").unwrap(), blob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Binary(Vec<u8>);

impl Binary {
    /// Wraps raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decodes a standard, padded base64 string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBase64`] if `encoded` is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|e| Error::InvalidBase64(e.to_string()))
    }

    /// Encodes the bytes as a single line of standard base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwraps the raw bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl serde::Serialize for Binary {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> serde::Deserialize<'de> for Binary {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Binary::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// Adapts any `serde::Serialize` type, such as a generated model struct, to
/// [`JsonEncodable`].
///
/// The value goes through `serde_json` directly, so encoder options do not
/// apply inside it.
#[derive(Debug, Clone, Copy)]
pub struct Serialized<T>(pub T);

impl<T: Serialize> JsonEncodable for Serialized<T> {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        serde_json::to_value(&self.0).map_err(|e| Error::SerializationFailed(e.to_string()))
    }
}

impl JsonEncodable for bool {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

macro_rules! encode_integer {
    ($($ty:ty),*) => {
        $(
            impl JsonEncodable for $ty {
                fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
                    Ok(Value::from(*self))
                }
            }
        )*
    };
}

encode_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl JsonEncodable for f64 {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        Number::from_f64(*self)
            .map(Value::Number)
            .ok_or(Error::NonFiniteNumber(*self))
    }
}

impl JsonEncodable for f32 {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        f64::from(*self).encode_json(encoder)
    }
}

impl JsonEncodable for str {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        Ok(Value::String(self.to_owned()))
    }
}

impl JsonEncodable for String {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        self.as_str().encode_json(encoder)
    }
}

impl JsonEncodable for char {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl JsonEncodable for Binary {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        Ok(Value::String(self.to_base64()))
    }
}

impl<Tz> JsonEncodable for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        encoder.options().format_timestamp(self).map(Value::String)
    }
}

/// Converts without panicking; `None` when chrono cannot represent the instant.
fn system_time_to_utc(time: SystemTime) -> Option<DateTime<Utc>> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => epoch.checked_add_signed(TimeDelta::from_std(after).ok()?),
        Err(before) => epoch.checked_sub_signed(TimeDelta::from_std(before.duration()).ok()?),
    }
}

impl JsonEncodable for SystemTime {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        let utc = system_time_to_utc(*self).ok_or_else(|| {
            Error::TimestampOutOfRange(format!("{self:?} is outside the representable range"))
        })?;
        utc.encode_json(encoder)
    }
}

impl JsonEncodable for Uuid {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        Ok(Value::String(self.hyphenated().to_string()))
    }
}

impl JsonEncodable for CalendarDate {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        let rendered = match encoder.options().calendar_date_style {
            CalendarDateStyle::Iso8601 => self.to_iso_string(),
            CalendarDateStyle::Unpadded => self.to_display_string(),
        };
        Ok(Value::String(rendered))
    }
}

impl JsonEncodable for Value {
    fn encode_json(&self, _encoder: &Encoder) -> Result<Value> {
        Ok(self.clone())
    }
}

impl<T: JsonEncodable> JsonEncodable for Option<T> {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        match self {
            Some(value) => value.encode_json(encoder),
            None => Ok(Value::Null),
        }
    }
}

impl<T: JsonEncodable + ?Sized> JsonEncodable for &T {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        (**self).encode_json(encoder)
    }
}

impl<T: JsonEncodable + ?Sized> JsonEncodable for Box<T> {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        (**self).encode_json(encoder)
    }
}

impl<T: JsonEncodable> JsonEncodable for [T] {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        self.iter()
            .map(|item| item.encode_json(encoder))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

impl<T: JsonEncodable, const N: usize> JsonEncodable for [T; N] {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        self.as_slice().encode_json(encoder)
    }
}

impl<T: JsonEncodable> JsonEncodable for Vec<T> {
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        self.as_slice().encode_json(encoder)
    }
}

fn encode_entries<'a, K, V, I>(entries: I, encoder: &Encoder) -> Result<Value>
where
    K: AsRef<str> + 'a,
    V: JsonEncodable + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let mut object = Map::new();
    for (key, value) in entries {
        object.insert(key.as_ref().to_owned(), value.encode_json(encoder)?);
    }
    Ok(Value::Object(object))
}

impl<K, V, S> JsonEncodable for HashMap<K, V, S>
where
    K: AsRef<str>,
    V: JsonEncodable,
    S: BuildHasher,
{
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        encode_entries(self, encoder)
    }
}

impl<K, V> JsonEncodable for BTreeMap<K, V>
where
    K: AsRef<str>,
    V: JsonEncodable,
{
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        encode_entries(self, encoder)
    }
}

impl<K, V, S> JsonEncodable for IndexMap<K, V, S>
where
    K: AsRef<str>,
    V: JsonEncodable,
    S: BuildHasher,
{
    fn encode_json(&self, encoder: &Encoder) -> Result<Value> {
        encode_entries(self, encoder)
    }
}
