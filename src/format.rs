//! Encoding configuration: how timestamps and calendar dates are written.
//!
//! Options are plain values handed to an [`Encoder`](crate::Encoder) when it
//! is built. Nothing here is global, so two encoders with different date
//! formats can coexist in one process.

use crate::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat, TimeZone, Utc};
use std::fmt::{self, Write};
use std::time::SystemTime;

/// The `strftime` equivalent of the pattern generated clients default to,
/// `yyyy-MM-dd'T'HH:mm:ss.SSSZZZZZ`.
pub const DEFAULT_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// How timestamps are rendered into strings.
///
/// Output never depends on the process locale: month and weekday names are
/// always English and digits are always ASCII.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use restmarshal::format::DateFormat;
///
/// let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
///
/// assert_eq!(DateFormat::Rfc3339.format(&instant).unwrap(), "2024-05-01T12:30:00.000Z");
/// assert_eq!(
///     DateFormat::HttpDate.format(&instant).unwrap(),
///     "Wed, 01 May 2024 12:30:00 GMT"
/// );
///
/// let custom = DateFormat::pattern("%d/%m/%Y").unwrap();
/// assert_eq!(custom.format(&instant).unwrap(), "01/05/2024");
///
/// assert!(DateFormat::pattern("%Q").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// RFC 3339 with millisecond precision, `Z` for UTC.
    #[default]
    Rfc3339,

    /// The IMF-fixdate form used by HTTP headers, always in GMT.
    HttpDate,

    /// A validated `strftime` pattern. Build it with [`DateFormat::pattern`].
    Pattern(String),
}

impl DateFormat {
    /// Creates a custom pattern format, rejecting malformed patterns up front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDateFormat`] if `pattern` contains an unknown or
    /// incomplete `%` specifier.
    pub fn pattern(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidDateFormat(pattern));
        }
        Ok(DateFormat::Pattern(pattern))
    }

    /// Formats `timestamp` in its own offset (HTTP dates are always GMT).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOutOfRange`] when an HTTP-date is requested
    /// for an instant outside 1970..=9999, and [`Error::InvalidDateFormat`]
    /// if a pattern that bypassed [`DateFormat::pattern`] fails to render.
    pub fn format<Tz>(&self, timestamp: &DateTime<Tz>) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            DateFormat::Rfc3339 => Ok(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
            DateFormat::HttpDate => {
                let utc = timestamp.with_timezone(&Utc);
                if utc.timestamp() < 0 || utc.year() > 9999 {
                    return Err(Error::TimestampOutOfRange(format!(
                        "{} cannot be written as an HTTP-date",
                        utc.to_rfc3339()
                    )));
                }
                Ok(httpdate::fmt_http_date(SystemTime::from(utc)))
            }
            DateFormat::Pattern(pattern) => {
                let mut out = String::new();
                write!(out, "{}", timestamp.format(pattern))
                    .map_err(|_| Error::InvalidDateFormat(pattern.clone()))?;
                Ok(out)
            }
        }
    }
}

/// How [`CalendarDate`](crate::CalendarDate) values are written when encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarDateStyle {
    /// Zero-padded ISO-8601 calendar form, `2024-03-09`.
    #[default]
    Iso8601,

    /// Plain decimal components without padding, `2024-3-9`.
    ///
    /// Matches what older generated clients sent; kept for servers that
    /// were written against that output.
    Unpadded,
}

/// Options that control how values are encoded.
///
/// # Examples
///
/// ```
/// use chrono::FixedOffset;
/// use restmarshal::format::{CalendarDateStyle, DateFormat, EncodeOptions};
///
/// let options = EncodeOptions::builder()
///     .date_format(DateFormat::pattern("%Y-%m-%d %H:%M")?)
///     .calendar_date_style(CalendarDateStyle::Unpadded)
///     .timestamp_offset(FixedOffset::east_opt(3600).unwrap())
///     .build();
///
/// assert_eq!(options.calendar_date_style, CalendarDateStyle::Unpadded);
/// # Ok::<(), restmarshal::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// How timestamps are rendered.
    ///
    /// Defaults to [`DateFormat::Rfc3339`].
    pub date_format: DateFormat,

    /// How calendar dates are rendered.
    ///
    /// Defaults to [`CalendarDateStyle::Iso8601`].
    pub calendar_date_style: CalendarDateStyle,

    /// Offset timestamps are shifted into before formatting.
    ///
    /// `None` keeps each timestamp's own offset; `SystemTime` values are
    /// treated as UTC.
    pub timestamp_offset: Option<FixedOffset>,
}

impl EncodeOptions {
    /// Creates a new builder for configuring encoding.
    pub fn builder() -> EncodeOptionsBuilder {
        EncodeOptionsBuilder::default()
    }

    /// Formats a timestamp according to these options.
    pub fn format_timestamp<Tz>(&self, timestamp: &DateTime<Tz>) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self.timestamp_offset {
            Some(offset) => self.date_format.format(&timestamp.with_timezone(&offset)),
            None => self.date_format.format(timestamp),
        }
    }
}

/// Builder for `EncodeOptions`.
#[derive(Default)]
pub struct EncodeOptionsBuilder {
    date_format: Option<DateFormat>,
    calendar_date_style: Option<CalendarDateStyle>,
    timestamp_offset: Option<FixedOffset>,
}

impl EncodeOptionsBuilder {
    /// Sets the timestamp format.
    pub fn date_format(mut self, format: DateFormat) -> Self {
        self.date_format = Some(format);
        self
    }

    /// Sets the calendar date style.
    pub fn calendar_date_style(mut self, style: CalendarDateStyle) -> Self {
        self.calendar_date_style = Some(style);
        self
    }

    /// Shifts every timestamp into `offset` before formatting.
    pub fn timestamp_offset(mut self, offset: FixedOffset) -> Self {
        self.timestamp_offset = Some(offset);
        self
    }

    /// Builds the `EncodeOptions`.
    pub fn build(self) -> EncodeOptions {
        let default = EncodeOptions::default();
        EncodeOptions {
            date_format: self.date_format.unwrap_or(default.date_format),
            calendar_date_style: self
                .calendar_date_style
                .unwrap_or(default.calendar_date_style),
            timestamp_offset: self.timestamp_offset.or(default.timestamp_offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 11, 7, 8, 5, 3).unwrap()
            + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn test_rfc3339_default() {
        assert_eq!(
            DateFormat::default().format(&instant()).unwrap(),
            "2021-11-07T08:05:03.042Z"
        );
    }

    #[test]
    fn test_rfc3339_keeps_offset() {
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        let shifted = instant().with_timezone(&offset);
        assert_eq!(
            DateFormat::Rfc3339.format(&shifted).unwrap(),
            "2021-11-07T04:05:03.042-04:00"
        );
    }

    #[test]
    fn test_default_pattern_matches_generated_client_layout() {
        let format = DateFormat::pattern(DEFAULT_PATTERN).unwrap();
        assert_eq!(
            format.format(&instant()).unwrap(),
            "2021-11-07T08:05:03.042+00:00"
        );
    }

    #[test]
    fn test_pattern_names_are_locale_independent() {
        let format = DateFormat::pattern("%A %B %e").unwrap();
        assert_eq!(format.format(&instant()).unwrap(), "Sunday November  7");
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        for bad in ["%Q", "%", "%Y-%"] {
            assert_eq!(
                DateFormat::pattern(bad),
                Err(Error::InvalidDateFormat(bad.to_string())),
                "pattern {bad:?}"
            );
        }
    }

    #[test]
    fn test_http_date() {
        assert_eq!(
            DateFormat::HttpDate.format(&instant()).unwrap(),
            "Sun, 07 Nov 2021 08:05:03 GMT"
        );
    }

    #[test]
    fn test_http_date_out_of_range() {
        let before_epoch = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap();
        assert!(matches!(
            DateFormat::HttpDate.format(&before_epoch),
            Err(Error::TimestampOutOfRange(_))
        ));
    }

    #[test]
    fn test_timestamp_offset_applied() {
        let options = EncodeOptions::builder()
            .timestamp_offset(FixedOffset::east_opt(9 * 3600).unwrap())
            .build();
        assert_eq!(
            options.format_timestamp(&instant()).unwrap(),
            "2021-11-07T17:05:03.042+09:00"
        );
    }

    #[test]
    fn test_builder_defaults() {
        let options = EncodeOptions::builder().build();
        assert_eq!(options, EncodeOptions::default());
        assert_eq!(options.date_format, DateFormat::Rfc3339);
        assert_eq!(options.calendar_date_style, CalendarDateStyle::Iso8601);
        assert_eq!(options.timestamp_offset, None);
    }
}
