//! Calendar dates without a time of day or time zone.
//!
//! [`CalendarDate`] is the value type generated API models use for
//! `format: date` fields. It stores the year, month and day exactly as given;
//! whether they describe a real day is only checked when the date is turned
//! back into a timestamp.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '-';

/// A year/month/day triple.
///
/// Components are not range-checked: `CalendarDate::new(2021, 13, 40)` is a
/// perfectly good value until you ask for its timestamp, at which point the
/// conversion reports that it cannot be resolved.
///
/// # Examples
///
/// ```
/// use restmarshal::CalendarDate;
///
/// let date = CalendarDate::new(2024, 3, 9);
/// assert_eq!(date.to_display_string(), "2024-3-9");
/// assert_eq!(date.to_iso_string(), "2024-03-09");
///
/// let parsed = CalendarDate::parse("2024-03-09").unwrap();
/// assert_eq!(parsed, date);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Creates a date from explicit components.
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Extracts the calendar date of `timestamp` as observed in `zone`.
    ///
    /// The same instant can fall on different days depending on the zone, so
    /// the zone is always explicit.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{FixedOffset, TimeZone, Utc};
    /// use restmarshal::CalendarDate;
    ///
    /// let instant = Utc.with_ymd_and_hms(2023, 12, 31, 22, 30, 0).unwrap();
    /// let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    ///
    /// assert_eq!(CalendarDate::from_timestamp(&instant, &Utc), CalendarDate::new(2023, 12, 31));
    /// assert_eq!(CalendarDate::from_timestamp(&instant, &tokyo), CalendarDate::new(2024, 1, 1));
    /// ```
    pub fn from_timestamp<Tz, Z>(timestamp: &DateTime<Tz>, zone: &Z) -> Self
    where
        Tz: TimeZone,
        Z: TimeZone,
    {
        let local = timestamp.with_timezone(zone);
        Self::new(local.year(), local.month(), local.day())
    }

    /// Parses a hyphen-delimited `year-month-day` string.
    ///
    /// Returns `None` unless there are exactly three fields and each is an
    /// integer. Zero padding is optional, so both `"2024-3-9"` and
    /// `"2024-03-09"` are accepted. Use the [`FromStr`] impl to learn why a
    /// string was rejected.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// The year component.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The month component, nominally `1..=12`.
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The day component, nominally `1..=31`.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Returns `true` if the components name a real day in the proleptic
    /// Gregorian calendar.
    pub fn is_valid(&self) -> bool {
        self.to_naive().is_some()
    }

    /// Converts to a [`NaiveDate`], or `None` for out-of-range components.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Returns the instant at which this day starts in `zone`.
    ///
    /// Returns `None` when the components do not form a real date, or when
    /// midnight does not exist in `zone` on that day (a daylight-saving gap).
    /// When midnight is ambiguous, the earlier instant is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use restmarshal::CalendarDate;
    ///
    /// let start = CalendarDate::new(2024, 2, 29).to_timestamp(&Utc).unwrap();
    /// assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    ///
    /// assert!(CalendarDate::new(2023, 2, 29).to_timestamp(&Utc).is_none());
    /// ```
    pub fn to_timestamp<Tz: TimeZone>(&self, zone: &Tz) -> Option<DateTime<Tz>> {
        let midnight = self.to_naive()?.and_hms_opt(0, 0, 0)?;
        zone.from_local_datetime(&midnight).earliest()
    }

    /// Like [`to_timestamp`](Self::to_timestamp), using the system time zone.
    pub fn to_local_timestamp(&self) -> Option<DateTime<Local>> {
        self.to_timestamp(&Local)
    }

    /// Like [`to_timestamp`](Self::to_timestamp), but reports the failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableDate`] when no instant matches.
    pub fn try_to_timestamp<Tz: TimeZone>(&self, zone: &Tz) -> Result<DateTime<Tz>> {
        self.to_timestamp(zone).ok_or_else(|| {
            tracing::debug!(
                year = self.year,
                month = self.month,
                day = self.day,
                "Calendar date does not resolve to a timestamp"
            );
            Error::UnresolvableDate {
                year: self.year,
                month: self.month,
                day: self.day,
            }
        })
    }

    /// Renders `year-month-day` without zero padding, e.g. `"5-1-2"`.
    ///
    /// This is also the [`Display`](fmt::Display) form.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// Renders the ISO-8601 calendar form `YYYY-MM-DD`, e.g. `"0005-01-02"`.
    ///
    /// Negative years keep four digits after the sign (`"-0044-03-15"`);
    /// years beyond four digits are written in full.
    pub fn to_iso_string(&self) -> String {
        let sign = if self.year < 0 { "-" } else { "" };
        format!(
            "{sign}{:04}-{:02}-{:02}",
            self.year.unsigned_abs(),
            self.month,
            self.day
        )
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}{SEPARATOR}{}", self.year, self.month, self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidDate {
            input: s.to_string(),
            reason,
        };

        // A leading hyphen is the sign of the year, not a separator.
        let (sign, unsigned) = match s.strip_prefix(SEPARATOR) {
            Some(rest) => ("-", rest),
            None => ("", s),
        };

        let fields: Vec<&str> = unsigned.split(SEPARATOR).collect();
        let [year, month, day] = fields.as_slice() else {
            return Err(invalid(format!(
                "expected 3 hyphen-separated fields, found {}",
                fields.len()
            )));
        };

        let year = format!("{sign}{year}");
        let year = year
            .parse::<i32>()
            .map_err(|e| invalid(format!("year {year:?}: {e}")))?;
        let month = month
            .parse::<u32>()
            .map_err(|e| invalid(format!("month {month:?}: {e}")))?;
        let day = day
            .parse::<u32>()
            .map_err(|e| invalid(format!("day {day:?}: {e}")))?;

        Ok(Self::new(year, month, day))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl TryFrom<CalendarDate> for NaiveDate {
    type Error = Error;

    fn try_from(date: CalendarDate) -> Result<Self> {
        date.to_naive().ok_or(Error::UnresolvableDate {
            year: date.year,
            month: date.month,
            day: date.day,
        })
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
