//! In-memory predicate filtering over fetched violation sets.
//!
//! The store only understands field equality, so every richer condition -
//! substring search, date ranges, derived-flag checks - is applied here,
//! after the fetch. All predicates in one [`Predicates`] value are ANDed;
//! there is no OR combinator. That is a design constraint carried over from
//! the admin console's search form, not an oversight.

use crate::core::temporal::{effective_instant, engine_offset};
use crate::entities::{Violation, ViolationStatus};
use chrono::{DateTime, NaiveDate, Utc};

/// Fields the substring search runs over, in match order:
/// violation number, violator name, license, plate, location, type.
pub const SEARCH_FIELDS: [&str; 6] = [
    "violationNumber",
    "name",
    "license",
    "plate",
    "location",
    "type",
];

/// Filter conditions applied in memory after the store's equality pass.
///
/// Every set condition must hold for a record to survive (AND semantics).
/// Unset conditions do not constrain. Empty or whitespace-only search terms
/// are treated as unset, matching how empty equality values are dropped at
/// the store boundary.
#[derive(Debug, Clone, Default)]
pub struct Predicates {
    /// Case-insensitive substring matched against [`SEARCH_FIELDS`].
    pub search: Option<String>,
    /// Inclusive lower date bound (normalized to start of day, engine offset).
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound (normalized to 23:59:59.999, engine offset).
    pub date_to: Option<NaiveDate>,
    /// Equality on the issuance-time repeat-offender flag.
    pub repeat_offender: Option<bool>,
    /// Equality on lifecycle status.
    pub status: Option<ViolationStatus>,
    /// Equality on the owning enforcer id.
    pub enforcer_id: Option<String>,
    /// Equality on the violation type.
    pub violation_type: Option<String>,
}

impl Predicates {
    /// Whether no condition is set (every record passes).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.as_ref().is_none_or(|s| s.trim().is_empty())
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.repeat_offender.is_none()
            && self.status.is_none()
            && self.enforcer_id.is_none()
            && self.violation_type.is_none()
    }
}

/// Applies the predicate set, returning the surviving records.
#[must_use]
pub fn apply(records: Vec<Violation>, predicates: &Predicates) -> Vec<Violation> {
    let search = predicates
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let range = date_range_bounds(predicates.date_from, predicates.date_to);

    records
        .into_iter()
        .filter(|record| {
            if let Some(term) = &search {
                if !matches_search(record, term) {
                    return false;
                }
            }
            if let Some((start, end)) = range {
                // A record with no resolvable date never matches a range.
                match effective_instant(record) {
                    Some(instant) => {
                        if instant < start || instant > end {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            if let Some(flag) = predicates.repeat_offender {
                if record.is_repeat_offender != flag {
                    return false;
                }
            }
            if let Some(status) = predicates.status {
                if record.status != status {
                    return false;
                }
            }
            if let Some(enforcer_id) = &predicates.enforcer_id {
                if record.enforcer_id.as_deref() != Some(enforcer_id.as_str()) {
                    return false;
                }
            }
            if let Some(violation_type) = &predicates.violation_type {
                if &record.violation_type != violation_type {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Normalizes the date bounds to an inclusive UTC instant range.
///
/// The lower bound becomes start-of-day and the upper bound 23:59:59.999 in
/// the engine's fixed offset. Inverted bounds are swapped rather than
/// rejected, per the clamp-don't-reject policy for caller misuse.
fn date_range_bounds(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if from.is_none() && to.is_none() {
        return None;
    }
    let (mut low, mut high) = match (from, to) {
        (Some(from), Some(to)) => (from, to),
        (Some(from), None) => (from, NaiveDate::MAX),
        (None, Some(to)) => (NaiveDate::MIN, to),
        (None, None) => unreachable!(),
    };
    if low > high {
        std::mem::swap(&mut low, &mut high);
    }
    Some((start_of_day(low), end_of_day(high)))
}

/// Start of the given calendar day in the engine's fixed offset.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(engine_offset()).single())
        .map_or(DateTime::<Utc>::MIN_UTC, |instant| {
            instant.with_timezone(&Utc)
        })
}

/// End of the given calendar day (23:59:59.999) in the engine's fixed offset.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .and_then(|naive| naive.and_local_timezone(engine_offset()).single())
        .map_or(DateTime::<Utc>::MAX_UTC, |instant| {
            instant.with_timezone(&Utc)
        })
}

fn matches_search(record: &Violation, lowered_term: &str) -> bool {
    [
        &record.violation_number,
        &record.name,
        &record.license,
        &record.plate,
        &record.location,
        &record.violation_type,
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(lowered_term))
}
