//! Repeat-offender detection - grouping violations by violator identity.
//!
//! The store has no joins and the system has no violator table, so identity
//! is derived per record from the violator facts. This report always
//! recomputes from the snapshot it is handed; it is *not* the same value as
//! the `is_repeat_offender` flag stamped on each violation at issuance,
//! which is a point-in-time snapshot that never updates. The two can
//! legitimately disagree.

use crate::config::EngineConfig;
use crate::core::paginate::by_effective_desc;
use crate::core::violations::fetch_violations;
use crate::entities::Violation;
use crate::errors::Result;
use crate::store::{EqualityFilters, RecordStore};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// How many of a group's most recent violations ride along with a summary.
pub const RECENT_SAMPLE_SIZE: usize = 5;

/// Derives the violator-matching key for a record.
///
/// Ordered priority, first non-empty (after trimming) wins:
/// 1. driver's license number
/// 2. vehicle plate
/// 3. violator name
///
/// Returns `None` when every identity field is blank; such records are
/// excluded from grouping and surfaced via `unidentified_count`.
#[must_use]
pub fn identity_key(record: &Violation) -> Option<String> {
    [&record.license, &record.plate, &record.name]
        .into_iter()
        .map(|field| field.trim())
        .find(|field| !field.is_empty())
        .map(str::to_string)
}

/// Aggregated view of one repeat violator.
#[derive(Debug, Clone, Serialize)]
pub struct RepeatOffenderSummary {
    /// The derived identity key the group was built on.
    pub identity_key: String,
    /// Violator name from the most recent violation.
    pub violator_name: String,
    /// License from the most recent violation.
    pub license: String,
    /// Plate from the most recent violation.
    pub plate: String,
    /// Violations attributed to this identity.
    pub violation_count: usize,
    /// Sum of all fines.
    pub total_fines: f64,
    /// Sum of fines with status paid.
    pub paid_fines: f64,
    /// Sum of fines still outstanding (pending or issued).
    pub pending_fines: f64,
    /// Most recent violation in the group.
    pub last_violation: Violation,
    /// Earliest violation in the group.
    pub first_violation: Violation,
    /// Up to [`RECENT_SAMPLE_SIZE`] most recent violations.
    pub recent_violations: Vec<Violation>,
}

/// Top-level statistics across all repeat-offender groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OffenderStats {
    /// Number of identities at or above the threshold.
    pub total_offenders: usize,
    /// Mean violation count across those groups, one decimal place.
    pub average_violations: f64,
    /// Largest group size.
    pub max_violations: usize,
}

/// Result of a repeat-offender pass over one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RepeatOffenderReport {
    /// Per-identity summaries, ordered by violation count descending.
    pub summaries: Vec<RepeatOffenderSummary>,
    /// Aggregate statistics.
    pub stats: OffenderStats,
    /// Records excluded because no identity field was set.
    pub unidentified_count: usize,
}

/// Groups a violation snapshot by violator identity and keeps groups with at
/// least `min_count` violations.
///
/// An empty snapshot yields zero groups and zero-valued statistics, not an
/// error. `min_count` below 2 is accepted but degenerates toward "every
/// violator" - callers are expected to pass at least 2.
#[must_use]
pub fn find_repeat_offenders(records: &[Violation], min_count: usize) -> RepeatOffenderReport {
    let mut groups: HashMap<String, Vec<Violation>> = HashMap::new();
    let mut unidentified_count = 0_usize;

    for record in records {
        match identity_key(record) {
            Some(key) => groups.entry(key).or_default().push(record.clone()),
            None => unidentified_count += 1,
        }
    }
    if unidentified_count > 0 {
        debug!(
            unidentified_count,
            "records without identity excluded from offender grouping"
        );
    }

    let mut summaries: Vec<RepeatOffenderSummary> = groups
        .into_iter()
        .filter(|(_, group)| group.len() >= min_count)
        .map(|(key, mut group)| summarize_group(key, &mut group))
        .collect();

    // Count descending; identity ascending on ties for a stable report.
    summaries.sort_by(|a, b| {
        b.violation_count
            .cmp(&a.violation_count)
            .then_with(|| a.identity_key.cmp(&b.identity_key))
    });

    let stats = compute_stats(&summaries);
    RepeatOffenderReport {
        summaries,
        stats,
        unidentified_count,
    }
}

/// Fetches a capped snapshot and runs the grouping pass over it.
///
/// `min_count` falls back to the configured threshold when `None`.
pub async fn repeat_offender_report(
    store: &dyn RecordStore,
    config: &EngineConfig,
    min_count: Option<usize>,
) -> Result<RepeatOffenderReport> {
    let min_count = min_count.unwrap_or(config.repeat_offender_min_count);
    info!(min_count, "building repeat-offender report");
    let violations = fetch_violations(store, config, &EqualityFilters::new()).await?;
    Ok(find_repeat_offenders(&violations, min_count))
}

fn summarize_group(identity: String, group: &mut Vec<Violation>) -> RepeatOffenderSummary {
    group.sort_by(by_effective_desc);

    let total_fines: f64 = group.iter().map(|v| v.fine_amount).sum();
    let paid_fines: f64 = group
        .iter()
        .filter(|v| v.status == crate::entities::ViolationStatus::Paid)
        .map(|v| v.fine_amount)
        .sum();
    let pending_fines: f64 = group
        .iter()
        .filter(|v| v.status.is_outstanding())
        .map(|v| v.fine_amount)
        .sum();

    // Sorted newest-first: head is the latest violation, tail the earliest.
    let last_violation = group[0].clone();
    let first_violation = group[group.len() - 1].clone();

    RepeatOffenderSummary {
        identity_key: identity,
        violator_name: last_violation.name.clone(),
        license: last_violation.license.clone(),
        plate: last_violation.plate.clone(),
        violation_count: group.len(),
        total_fines,
        paid_fines,
        pending_fines,
        recent_violations: group.iter().take(RECENT_SAMPLE_SIZE).cloned().collect(),
        last_violation,
        first_violation,
    }
}

fn compute_stats(summaries: &[RepeatOffenderSummary]) -> OffenderStats {
    if summaries.is_empty() {
        return OffenderStats::default();
    }
    let total: usize = summaries.iter().map(|s| s.violation_count).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = (total as f64 / summaries.len() as f64 * 10.0).round() / 10.0;
    OffenderStats {
        total_offenders: summaries.len(),
        average_violations: average,
        max_violations: summaries
            .iter()
            .map(|s| s.violation_count)
            .max()
            .unwrap_or(0),
    }
}
