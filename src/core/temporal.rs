//! Timestamp normalization for heterogeneous document timestamps.
//!
//! Documents reach the engine carrying timestamps in whatever shape the
//! writing client produced: a store-native `{seconds, nanos}` object, Unix
//! milliseconds, an ISO-8601 string, or the `"M-D-Y H:M:S"` strings emitted
//! by field devices. This module collapses all of them into one canonical
//! `DateTime<Utc>` at the boundary so no downstream component ever branches
//! on representation.
//!
//! Device clocks have no timezone awareness; any reading without explicit
//! offset information is reconstructed as if it occurred in the fixed
//! [`FIXED_UTC_OFFSET_HOURS`] zone, never in the server's local zone. The
//! same fixed offset drives every calendar bucketing decision in the engine,
//! so a ticket captured at 23:30 local buckets into the day the enforcer
//! actually wrote it.

use crate::entities::Violation;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Fixed offset applied to timezone-naive readings, in hours east of UTC.
pub const FIXED_UTC_OFFSET_HOURS: i32 = 8;

/// A timestamp value exactly as it appears in a stored document.
///
/// This type exists only at the entity boundary; call [`normalize`] to get
/// the canonical instant and work with that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Store-native timestamp object.
    Native {
        /// Seconds since the Unix epoch.
        seconds: i64,
        /// Sub-second nanoseconds.
        #[serde(default)]
        nanos: u32,
    },
    /// Unix epoch milliseconds, as written by older admin-console clients.
    Millis(i64),
    /// ISO-8601 or device-formatted string.
    Text(String),
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Text(value.to_rfc3339())
    }
}

/// Why a raw timestamp could not be normalized.
///
/// These never escape an aggregation call; the record that produced one is
/// excluded from the view that needed the instant, and the caller supplies a
/// fallback (typically "now") where a value is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The value was empty or whitespace.
    #[error("empty timestamp value")]
    Empty,
    /// A device string did not split into exactly `<date> <time>`.
    #[error("expected '<date> <time>', found {found} token(s)")]
    TokenCount {
        /// Number of space-separated tokens found.
        found: usize,
    },
    /// A date or time component was not a number.
    #[error("non-numeric timestamp component '{component}'")]
    NonNumeric {
        /// The offending component.
        component: String,
    },
    /// The corrected components did not form a valid calendar date.
    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate {
        /// Parsed (and corrected) year.
        year: i32,
        /// Parsed month.
        month: u32,
        /// Parsed day.
        day: u32,
    },
    /// The time-of-day components were out of range.
    #[error("invalid time of day {hour:02}:{minute:02}:{second:02}")]
    InvalidTime {
        /// Parsed hour.
        hour: u32,
        /// Parsed minute.
        minute: u32,
        /// Parsed second.
        second: u32,
    },
    /// A numeric epoch value was outside the representable range.
    #[error("epoch value out of range: {value}")]
    OutOfRange {
        /// The offending epoch value.
        value: i64,
    },
}

/// Returns the fixed offset naive readings are interpreted in.
#[must_use]
pub fn engine_offset() -> FixedOffset {
    // 8 hours east is well inside chrono's valid offset range.
    FixedOffset::east_opt(FIXED_UTC_OFFSET_HOURS * 3600).expect("fixed offset in range")
}

/// Normalizes a raw document timestamp into a canonical UTC instant.
///
/// Accepts every representation the system has historically written (see
/// [`RawTimestamp`]). Structurally invalid input yields an error, never a
/// panic; callers absorb the error per-record.
///
/// # Errors
/// Returns a [`NormalizeError`] describing the first structural problem
/// encountered.
pub fn normalize(raw: &RawTimestamp) -> Result<DateTime<Utc>, NormalizeError> {
    match raw {
        RawTimestamp::Native { seconds, nanos } => Utc
            .timestamp_opt(*seconds, *nanos)
            .single()
            .ok_or(NormalizeError::OutOfRange { value: *seconds }),
        RawTimestamp::Millis(millis) => Utc
            .timestamp_millis_opt(*millis)
            .single()
            .ok_or(NormalizeError::OutOfRange { value: *millis }),
        RawTimestamp::Text(text) => normalize_text(text),
    }
}

/// Resolves the instant a violation is bucketed and compared by.
///
/// Ordered field priority, by decreasing trustworthiness of the source:
/// 1. `captured_at` - device-reported capture time
/// 2. `occurred_at` - admin-entered event time
/// 3. `created_at`  - store-assigned creation time
///
/// A field that is absent *or* fails to normalize falls through to the next;
/// a record that resolves nowhere returns `None` and is excluded from every
/// date-dependent view rather than being guessed into a bucket.
#[must_use]
pub fn effective_instant(violation: &Violation) -> Option<DateTime<Utc>> {
    [
        violation.captured_at.as_ref(),
        violation.occurred_at.as_ref(),
        violation.created_at.as_ref(),
    ]
    .into_iter()
    .flatten()
    .find_map(|raw| normalize(raw).ok())
}

/// The calendar date of an instant in the engine's fixed offset.
#[must_use]
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&engine_offset()).date_naive()
}

fn normalize_text(text: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Empty);
    }

    // Offset-carrying ISO strings state their own zone.
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    // Offset-less ISO strings are naive readings like device strings.
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return to_fixed_zone_instant(naive);
    }

    parse_device_string(trimmed)
}

/// Parses the `"<date> <time>"` strings produced by field devices.
///
/// Date is `M-D-Y` or `M/D/Y` (separators interchangeable); time is `H:M:S`
/// or `H.M.S` with seconds optional. Two corrections are applied before
/// validation:
/// - a year above 9999 is truncated to its first four digits (known firmware
///   bug duplicates a digit, e.g. `20255` for 2025)
/// - a two-digit year is read as `2000 + year`
fn parse_device_string(text: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let tokens: Vec<&str> = text.split(' ').collect();
    if tokens.len() != 2 {
        return Err(NormalizeError::TokenCount {
            found: tokens.len(),
        });
    }

    let date_parts: Vec<&str> = tokens[0].split(['-', '/']).collect();
    if date_parts.len() != 3 {
        return Err(NormalizeError::NonNumeric {
            component: tokens[0].to_string(),
        });
    }
    let month = parse_component(date_parts[0])?;
    let day = parse_component(date_parts[1])?;
    let year = correct_year(parse_component(date_parts[2])?, text);

    let time_parts: Vec<&str> = tokens[1].split([':', '.']).collect();
    if !(2..=3).contains(&time_parts.len()) {
        return Err(NormalizeError::NonNumeric {
            component: tokens[1].to_string(),
        });
    }
    let hour = parse_component(time_parts[0])?;
    let minute = parse_component(time_parts[1])?;
    let second = if time_parts.len() == 3 {
        parse_component(time_parts[2])?
    } else {
        0
    };

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(NormalizeError::InvalidDate {
        year,
        month,
        day,
    })?;
    let time =
        NaiveTime::from_hms_opt(hour, minute, second).ok_or(NormalizeError::InvalidTime {
            hour,
            minute,
            second,
        })?;

    to_fixed_zone_instant(date.and_time(time))
}

fn parse_component(component: &str) -> Result<u32, NormalizeError> {
    component
        .parse::<u32>()
        .map_err(|_| NormalizeError::NonNumeric {
            component: component.to_string(),
        })
}

/// Applies the firmware digit-duplication fix and two-digit-year expansion.
fn correct_year(parsed: u32, source: &str) -> i32 {
    if parsed > 9999 {
        let digits = parsed.to_string();
        // Pure digits, so the 4-char prefix always reparses.
        let truncated: i32 = digits[..4].parse().expect("digit prefix parses");
        debug!(source, parsed, truncated, "corrected duplicated-digit year");
        return truncated;
    }
    if parsed < 100 {
        return 2000 + i32::try_from(parsed).expect("two-digit year fits");
    }
    i32::try_from(parsed).expect("four-digit year fits")
}

fn to_fixed_zone_instant(naive: NaiveDateTime) -> Result<DateTime<Utc>, NormalizeError> {
    naive
        .and_local_timezone(engine_offset())
        .single()
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or(NormalizeError::OutOfRange {
            value: naive.and_utc().timestamp(),
        })
}
