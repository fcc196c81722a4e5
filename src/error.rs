//! Error types for request marshalling.
//!
//! Every fallible helper in this crate reports through [`Error`]. The
//! operations that conceptually return "nothing" on failure (such as
//! [`CalendarDate::parse`](crate::CalendarDate::parse)) still return
//! `Option`; their `Result`-returning siblings carry the reason instead.

/// The main error type for marshalling request data.
///
/// # Examples
///
/// ```
/// use restmarshal::{CalendarDate, Error};
///
/// match "2020-ab-01".parse::<CalendarDate>() {
///     Ok(date) => println!("Parsed {}", date),
///     Err(Error::InvalidDate { input, reason }) => {
///         eprintln!("Rejected {:?}: {}", input, reason);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A calendar date string could not be parsed.
    ///
    /// # Fields
    ///
    /// * `input` - The string that was rejected
    /// * `reason` - What was wrong with it
    #[error("Invalid calendar date {input:?}: {reason}")]
    InvalidDate {
        /// The rejected input.
        input: String,
        /// Why the input was rejected.
        reason: String,
    },

    /// The calendar date components do not resolve to a real instant.
    ///
    /// Components are accepted as-is at construction; this surfaces when
    /// the date is converted to a timestamp.
    #[error("Calendar date {year}-{month}-{day} does not resolve to a timestamp")]
    UnresolvableDate {
        /// The year component.
        year: i32,
        /// The month component.
        month: u32,
        /// The day component.
        day: u32,
    },

    /// A custom timestamp pattern is not a valid `strftime` pattern.
    #[error("Invalid date format pattern: {0:?}")]
    InvalidDateFormat(String),

    /// A timestamp cannot be written in the requested format, such as an
    /// HTTP-date before 1970.
    #[error("Timestamp out of range for format: {0}")]
    TimestampOutOfRange(String),

    /// A floating point value has no JSON representation (NaN or infinite).
    #[error("Cannot encode non-finite number {0} as JSON")]
    NonFiniteNumber(f64),

    /// A string is not valid standard base64.
    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    /// A header name or value is not valid for HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Failed to serialize a value.
    #[error("Failed to serialize value: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    ///
    /// This wraps URL parsing errors.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this error came from rejecting caller-supplied input
    /// (a date string, base64 payload, header or URL) rather than from
    /// encoding a value.
    ///
    /// # Examples
    ///
    /// ```
    /// use restmarshal::Error;
    ///
    /// assert!(Error::InvalidHeader("bad name".to_string()).is_input_error());
    /// assert!(!Error::NonFiniteNumber(f64::NAN).is_input_error());
    /// ```
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::InvalidDate { .. } => true,
            Error::InvalidBase64(_) => true,
            Error::InvalidHeader(_) => true,
            Error::InvalidUrl(_) => true,
            Error::UnresolvableDate { .. } => false,
            Error::InvalidDateFormat(_) => false,
            Error::TimestampOutOfRange(_) => false,
            Error::NonFiniteNumber(_) => false,
            Error::SerializationFailed(_) => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationFailed(e.to_string())
    }
}

/// A specialized `Result` type for marshalling operations.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
