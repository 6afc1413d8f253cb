//! # Temporal Types — `date-time` Recognition
//!
//! Defines `Timestamp`, the value a string must parse into to satisfy a
//! `format: date-time` rule. Document authors write timestamps by hand, so
//! parsing is lenient: any offset is accepted and converted to UTC, and
//! offset-less ISO 8601 forms are read as UTC.
//!
//! Accepted layouts:
//!
//! - `2026-01-15T12:00:00Z`, `2026-01-15T17:00:00+05:00`, with optional
//!   fractional seconds; the offset may also be written `+0500`
//! - `2026-01-15T12:00Z`, `2026-01-15T12:00+05:00`
//! - `2026-01-15T12:00:00`, `2026-01-15T12:00`, also with a space instead of `T`
//! - `2026-01-15`, and the reduced forms `2026-01` and `2026` (first day of the
//!   month or year, at midnight)

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::CoreError;

/// Date-time layouts carrying a numeric offset, tried after RFC 3339.
const OFFSET_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Offset-less date-time layouts.
const NAIVE_DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_LAYOUT: &str = "%Y-%m-%d";

/// A UTC timestamp read from a document string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parse a timestamp from any of the accepted layouts.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if no layout matches, or if the
    /// string names an impossible calendar date such as `2026-02-30`.
    pub fn parse_lenient(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }
        for layout in OFFSET_LAYOUTS {
            if let Ok(dt) = DateTime::parse_from_str(s, layout) {
                return Ok(Self(dt.with_timezone(&Utc)));
            }
        }
        for layout in NAIVE_DATE_TIME_LAYOUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
                return Ok(Self(Utc.from_utc_datetime(&naive)));
            }
        }

        let date = match NaiveDate::parse_from_str(s, DATE_LAYOUT) {
            Ok(date) => date,
            Err(e) => reduced_date(s).ok_or_else(|| CoreError::InvalidTimestamp {
                input: s.to_string(),
                reason: e.to_string(),
            })?,
        };
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CoreError::InvalidTimestamp {
                input: s.to_string(),
                reason: "date has no midnight".to_string(),
            })?;
        Ok(Self(Utc.from_utc_datetime(&midnight)))
    }

    /// Returns true if `s` parses under any accepted layout.
    pub fn is_valid(s: &str) -> bool {
        Self::parse_lenient(s).is_ok()
    }
}

/// `YYYY` or `YYYY-MM`, resolved to the first day of the period.
fn reduced_date(s: &str) -> Option<NaiveDate> {
    let (year, month) = match s.split_once('-') {
        Some((year, month)) => (year, Some(month)),
        None => (s, None),
    };
    let year = fixed_digits(year, 4)?;
    let month = match month {
        Some(month) => fixed_digits(month, 2)?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)
}

fn fixed_digits(s: &str, width: usize) -> Option<u32> {
    if s.len() == width && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}
