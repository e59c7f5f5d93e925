//! Time- and actor-bucketed rollups: dashboard, daily, monthly, performance.
//!
//! Every view here is rebuilt from scratch on each call from one fetched
//! snapshot of the violation set - the engine holds no state between calls
//! and concurrent writes during a computation are simply not reflected in
//! it. Calendar bucketing runs on the effective instant in the engine's
//! fixed offset; a record whose date cannot be resolved is excluded from
//! every bucketed view (and logged), never guessed into a bucket that would
//! corrupt the totals.

use crate::config::EngineConfig;
use crate::core::enrich::attach_actor_names;
use crate::core::paginate::by_effective_desc;
use crate::core::temporal::{effective_instant, engine_offset, local_date};
use crate::core::violations::{fetch_active_enforcers, fetch_violations};
use crate::entities::{EnrichedViolation, User, Violation, ViolationStatus};
use crate::errors::{Error, Result};
use crate::store::{EqualityFilters, RecordStore};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Months covered by the dashboard trend series, current month included.
pub const TREND_MONTHS: u32 = 6;
/// Recent violations shown on the dashboard.
pub const DASHBOARD_RECENT_LIMIT: usize = 10;
/// Enforcers shown in the dashboard top list.
pub const DASHBOARD_TOP_ENFORCERS: usize = 10;
/// Recent violations listed in a daily summary.
pub const DAILY_RECENT_LIMIT: usize = 10;

/// One month of the dashboard trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrendPoint {
    /// Calendar month, `YYYY-MM`, engine offset.
    pub month: String,
    /// Violations in the month.
    pub violation_count: u64,
    /// Sum of fines issued in the month.
    pub total_fines: f64,
    /// Sum of fines already collected (status paid).
    pub collected_fines: f64,
    /// Count of paid violations.
    pub paid_count: u64,
}

/// Violation tally for one enforcer on the dashboard top list.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcerTally {
    /// Enforcer id.
    pub enforcer_id: String,
    /// Resolved name, or "Unknown" for unresolvable references.
    pub enforcer_name: String,
    /// Resolved badge number, or "Unknown".
    pub badge_number: String,
    /// Violations attributed to the enforcer.
    pub violation_count: u64,
}

/// The admin dashboard view.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Violations in the snapshot.
    pub total_violations: u64,
    /// Sum of all fines.
    pub total_fines: f64,
    /// Sum of collected fines.
    pub collected_fines: f64,
    /// Status histogram; only statuses that occur appear.
    pub status_counts: BTreeMap<ViolationStatus, u64>,
    /// Trailing [`TREND_MONTHS`] calendar months, oldest first.
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    /// Most recent violations, enriched with actor names.
    pub recent_violations: Vec<EnrichedViolation>,
    /// Top enforcers by violation count.
    pub top_enforcers: Vec<EnforcerTally>,
}

/// Per-type slice of a daily summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBreakdown {
    /// Violations of this type.
    pub count: u64,
    /// Sum of their fines.
    pub total_fines: f64,
    /// Mean fine for the type.
    pub average_fine: f64,
}

/// One enforcer's activity within a daily summary.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcerDailyActivity {
    /// Enforcer id.
    pub enforcer_id: String,
    /// Display name.
    pub enforcer_name: String,
    /// Badge number.
    pub badge_number: String,
    /// Violations issued that day.
    pub violation_count: u64,
    /// Sum of fines issued that day.
    pub total_fines: f64,
    /// Paid count among them.
    pub paid_count: u64,
    /// Still-outstanding count among them.
    pub pending_count: u64,
}

/// A formatted line for the daily summary's recent list.
#[derive(Debug, Clone, Serialize)]
pub struct RecentViolationLine {
    /// Human-facing violation number.
    pub violation_number: String,
    /// Violator name.
    pub violator_name: String,
    /// Violation type.
    pub violation_type: String,
    /// Location.
    pub location: String,
    /// Local time of day, `HH:MM`.
    pub time: String,
    /// Formatted fine amount.
    pub amount: String,
}

/// Rollup of one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    /// The day summarized.
    pub date: NaiveDate,
    /// Violations on the day.
    pub total_violations: u64,
    /// Sum of their fines.
    pub total_fines: f64,
    /// Status histogram.
    pub status_counts: BTreeMap<ViolationStatus, u64>,
    /// Per-type histogram.
    pub type_breakdown: BTreeMap<String, TypeBreakdown>,
    /// One row per active enforcer, zero-activity enforcers included.
    pub enforcer_activity: Vec<EnforcerDailyActivity>,
    /// Most recent violations of the day, formatted for display.
    pub recent_violations: Vec<RecentViolationLine>,
}

/// One day of a monthly report's series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    /// Calendar date.
    pub date: NaiveDate,
    /// Violations on that date.
    pub count: u64,
}

/// Rollup of one calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    /// Report year.
    pub year: i32,
    /// Report month, 1-12.
    pub month: u32,
    /// Violations in the month.
    pub total_violations: u64,
    /// Sum of their fines.
    pub total_fines: f64,
    /// Sum of collected fines.
    pub collected_fines: f64,
    /// Status histogram.
    pub status_counts: BTreeMap<ViolationStatus, u64>,
    /// One entry per day of the month, zero days included.
    pub daily_counts: Vec<DailyCount>,
}

/// Performance figures for one enforcer.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcerPerformance {
    /// Enforcer id.
    pub enforcer_id: String,
    /// Display name.
    pub enforcer_name: String,
    /// Badge number.
    pub badge_number: String,
    /// All-time violation count.
    pub violation_count: u64,
    /// Sum of all fines issued.
    pub total_fines: f64,
    /// Sum of collected fines.
    pub collected_fines: f64,
    /// Sum of still-outstanding fines.
    pub pending_fines: f64,
    /// Paid violation count.
    pub paid_count: u64,
    /// Outstanding violation count.
    pub pending_count: u64,
    /// Violations issued today (engine offset).
    pub today_count: u64,
    /// Violations issued in the current calendar month.
    pub month_count: u64,
    /// Collected over total fines, as a percentage; 0 when nothing issued.
    pub collection_rate: f64,
    /// Mean fine amount; 0 when nothing issued.
    pub avg_fine_amount: f64,
}

/// Builds the dashboard view from the current snapshot.
///
/// `now` anchors the trailing trend window; pass `Utc::now()` outside of
/// tests.
pub async fn dashboard_snapshot(
    store: &dyn RecordStore,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<DashboardSnapshot> {
    info!("building dashboard snapshot");
    let violations = fetch_violations(store, config, &EqualityFilters::new()).await?;

    let total_fines: f64 = violations.iter().map(|v| v.fine_amount).sum();
    let collected_fines = collected(&violations);
    let status_counts = status_histogram(&violations);
    let monthly_trend = trend_series(&violations, now);

    let mut recent = violations.clone();
    recent.sort_by(by_effective_desc);
    recent.truncate(DASHBOARD_RECENT_LIMIT);
    let recent_violations = attach_actor_names(store, recent).await;

    let top_enforcers = top_enforcers(store, &violations).await?;

    Ok(DashboardSnapshot {
        total_violations: violations.len() as u64,
        total_fines,
        collected_fines,
        status_counts,
        monthly_trend,
        recent_violations,
        top_enforcers,
    })
}

/// Builds the summary of one calendar day (engine offset).
pub async fn daily_summary(
    store: &dyn RecordStore,
    config: &EngineConfig,
    date: NaiveDate,
) -> Result<DailySummary> {
    info!(%date, "building daily summary");
    let violations = fetch_violations(store, config, &EqualityFilters::new()).await?;
    let enforcers = fetch_active_enforcers(store).await?;

    let day_violations: Vec<Violation> = bucketed(&violations)
        .into_iter()
        .filter(|(instant, _)| local_date(*instant) == date)
        .map(|(_, violation)| violation.clone())
        .collect();

    let total_fines: f64 = day_violations.iter().map(|v| v.fine_amount).sum();
    let status_counts = status_histogram(&day_violations);
    let type_breakdown = type_histogram(&day_violations);
    let enforcer_activity = enforcer_day_rows(&day_violations, &enforcers);

    let mut recent = day_violations.clone();
    recent.sort_by(by_effective_desc);
    let recent_violations = recent
        .iter()
        .take(DAILY_RECENT_LIMIT)
        .map(format_recent_line)
        .collect();

    Ok(DailySummary {
        date,
        total_violations: day_violations.len() as u64,
        total_fines,
        status_counts,
        type_breakdown,
        enforcer_activity,
        recent_violations,
    })
}

/// Builds the report for one calendar month.
///
/// # Errors
/// [`Error::InvalidInput`] when `month` is not 1-12 - a structurally
/// meaningless value that cannot be clamped to anything sensible.
pub async fn monthly_report(
    store: &dyn RecordStore,
    config: &EngineConfig,
    year: i32,
    month: u32,
) -> Result<MonthlyReport> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidInput {
            message: format!("month must be 1-12, got {month}"),
        });
    }
    info!(year, month, "building monthly report");
    let violations = fetch_violations(store, config, &EqualityFilters::new()).await?;

    let month_violations: Vec<Violation> = bucketed(&violations)
        .into_iter()
        .filter(|(instant, _)| {
            let local = instant.with_timezone(&engine_offset());
            local.year() == year && local.month() == month
        })
        .map(|(_, violation)| violation.clone())
        .collect();

    let mut per_day: HashMap<u32, u64> = HashMap::new();
    for violation in &month_violations {
        if let Some(instant) = effective_instant(violation) {
            *per_day
                .entry(instant.with_timezone(&engine_offset()).day())
                .or_insert(0) += 1;
        }
    }

    // Every day of the month appears, zero days included.
    let daily_counts: Vec<DailyCount> = (1..=days_in_month(year, month))
        .filter_map(|day| {
            NaiveDate::from_ymd_opt(year, month, day).map(|date| DailyCount {
                date,
                count: per_day.get(&day).copied().unwrap_or(0),
            })
        })
        .collect();

    let total_fines: f64 = month_violations.iter().map(|v| v.fine_amount).sum();
    Ok(MonthlyReport {
        year,
        month,
        total_violations: month_violations.len() as u64,
        total_fines,
        collected_fines: collected(&month_violations),
        status_counts: status_histogram(&month_violations),
        daily_counts,
    })
}

/// Builds the per-enforcer performance report.
///
/// Covers every active enforcer, zero-activity ones included; ordered by
/// violation count descending, then name.
pub async fn enforcer_performance(
    store: &dyn RecordStore,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<Vec<EnforcerPerformance>> {
    info!("building enforcer performance report");
    let violations = fetch_violations(store, config, &EqualityFilters::new()).await?;
    let enforcers = fetch_active_enforcers(store).await?;

    let today = local_date(now);
    let now_local = now.with_timezone(&engine_offset());

    let mut rows: Vec<EnforcerPerformance> = enforcers
        .iter()
        .map(|enforcer| {
            let owned: Vec<&Violation> = violations
                .iter()
                .filter(|v| v.enforcer_id.as_deref() == Some(enforcer.id.as_str()))
                .collect();

            let total_fines: f64 = owned.iter().map(|v| v.fine_amount).sum();
            let collected_fines: f64 = owned
                .iter()
                .filter(|v| v.status == ViolationStatus::Paid)
                .map(|v| v.fine_amount)
                .sum();
            let pending_fines: f64 = owned
                .iter()
                .filter(|v| v.status.is_outstanding())
                .map(|v| v.fine_amount)
                .sum();
            let paid_count = owned
                .iter()
                .filter(|v| v.status == ViolationStatus::Paid)
                .count() as u64;
            let pending_count = owned.iter().filter(|v| v.status.is_outstanding()).count() as u64;

            let today_count = owned
                .iter()
                .filter(|v| effective_instant(v).is_some_and(|i| local_date(i) == today))
                .count() as u64;
            let month_count = owned
                .iter()
                .filter(|v| {
                    effective_instant(v).is_some_and(|i| {
                        let local = i.with_timezone(&engine_offset());
                        local.year() == now_local.year() && local.month() == now_local.month()
                    })
                })
                .count() as u64;

            let collection_rate = if total_fines > 0.0 {
                collected_fines / total_fines * 100.0
            } else {
                0.0
            };
            #[allow(clippy::cast_precision_loss)]
            let avg_fine_amount = if owned.is_empty() {
                0.0
            } else {
                total_fines / owned.len() as f64
            };

            EnforcerPerformance {
                enforcer_id: enforcer.id.clone(),
                enforcer_name: enforcer.full_name.clone(),
                badge_number: enforcer.badge_number.clone(),
                violation_count: owned.len() as u64,
                total_fines,
                collected_fines,
                pending_fines,
                paid_count,
                pending_count,
                today_count,
                month_count,
                collection_rate,
                avg_fine_amount,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.violation_count
            .cmp(&a.violation_count)
            .then_with(|| a.enforcer_name.cmp(&b.enforcer_name))
    });
    Ok(rows)
}

/// Formats a fine amount for display.
#[must_use]
pub fn format_fine_amount(amount: f64) -> String {
    format!("₱{amount:.2}")
}

/// Pairs each record with its effective instant, dropping (and logging)
/// records whose date cannot be resolved.
fn bucketed(violations: &[Violation]) -> Vec<(DateTime<Utc>, &Violation)> {
    let mut resolved = Vec::with_capacity(violations.len());
    let mut undated = 0_usize;
    for violation in violations {
        match effective_instant(violation) {
            Some(instant) => resolved.push((instant, violation)),
            None => undated += 1,
        }
    }
    if undated > 0 {
        debug!(
            undated,
            "records without a resolvable date excluded from time buckets"
        );
    }
    resolved
}

fn status_histogram(violations: &[Violation]) -> BTreeMap<ViolationStatus, u64> {
    let mut counts = BTreeMap::new();
    for violation in violations {
        *counts.entry(violation.status).or_insert(0) += 1;
    }
    counts
}

fn type_histogram(violations: &[Violation]) -> BTreeMap<String, TypeBreakdown> {
    let mut sums: BTreeMap<String, (u64, f64)> = BTreeMap::new();
    for violation in violations {
        let entry = sums.entry(violation.violation_type.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += violation.fine_amount;
    }
    sums.into_iter()
        .map(|(violation_type, (count, total_fines))| {
            #[allow(clippy::cast_precision_loss)]
            let average_fine = total_fines / count as f64;
            (
                violation_type,
                TypeBreakdown {
                    count,
                    total_fines,
                    average_fine,
                },
            )
        })
        .collect()
}

fn collected(violations: &[Violation]) -> f64 {
    violations
        .iter()
        .filter(|v| v.status == ViolationStatus::Paid)
        .map(|v| v.fine_amount)
        .sum()
}

/// The trailing [`TREND_MONTHS`] series, oldest month first.
fn trend_series(violations: &[Violation], now: DateTime<Utc>) -> Vec<MonthlyTrendPoint> {
    let mut by_month: HashMap<String, (u64, f64, f64, u64)> = HashMap::new();
    for (instant, violation) in bucketed(violations) {
        let key = instant.with_timezone(&engine_offset()).format("%Y-%m").to_string();
        let entry = by_month.entry(key).or_insert((0, 0.0, 0.0, 0));
        entry.0 += 1;
        entry.1 += violation.fine_amount;
        if violation.status == ViolationStatus::Paid {
            entry.2 += violation.fine_amount;
            entry.3 += 1;
        }
    }

    let current_month_start = local_date(now).with_day(1);
    (0..TREND_MONTHS)
        .rev()
        .filter_map(|months_back| {
            current_month_start
                .and_then(|start| start.checked_sub_months(Months::new(months_back)))
                .map(|month_start| {
                    let key = month_start.format("%Y-%m").to_string();
                    let (violation_count, total_fines, collected_fines, paid_count) =
                        by_month.get(&key).copied().unwrap_or((0, 0.0, 0.0, 0));
                    MonthlyTrendPoint {
                        month: key,
                        violation_count,
                        total_fines,
                        collected_fines,
                        paid_count,
                    }
                })
        })
        .collect()
}

async fn top_enforcers(
    store: &dyn RecordStore,
    violations: &[Violation],
) -> Result<Vec<EnforcerTally>> {
    use crate::core::enrich::UNKNOWN_ACTOR;
    use crate::store::{USERS, decode_records};

    let mut tallies: HashMap<String, u64> = HashMap::new();
    for violation in violations {
        if let Some(enforcer_id) = &violation.enforcer_id {
            *tallies.entry(enforcer_id.clone()).or_insert(0) += 1;
        }
    }

    let documents = store.find_many(USERS, &EqualityFilters::new(), None).await?;
    let users: Vec<User> = decode_records(USERS, documents);
    let by_id: HashMap<&str, &User> = users.iter().map(|user| (user.id.as_str(), user)).collect();

    let mut rows: Vec<EnforcerTally> = tallies
        .into_iter()
        .map(|(enforcer_id, violation_count)| {
            let user = by_id.get(enforcer_id.as_str());
            EnforcerTally {
                enforcer_name: user
                    .map_or(UNKNOWN_ACTOR.to_string(), |u| u.full_name.clone()),
                badge_number: user
                    .map_or(UNKNOWN_ACTOR.to_string(), |u| u.badge_number.clone()),
                enforcer_id,
                violation_count,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.violation_count
            .cmp(&a.violation_count)
            .then_with(|| a.enforcer_id.cmp(&b.enforcer_id))
    });
    rows.truncate(DASHBOARD_TOP_ENFORCERS);
    Ok(rows)
}

fn enforcer_day_rows(
    day_violations: &[Violation],
    enforcers: &[User],
) -> Vec<EnforcerDailyActivity> {
    let mut rows: Vec<EnforcerDailyActivity> = enforcers
        .iter()
        .map(|enforcer| {
            let owned: Vec<&Violation> = day_violations
                .iter()
                .filter(|v| v.enforcer_id.as_deref() == Some(enforcer.id.as_str()))
                .collect();
            EnforcerDailyActivity {
                enforcer_id: enforcer.id.clone(),
                enforcer_name: enforcer.full_name.clone(),
                badge_number: enforcer.badge_number.clone(),
                violation_count: owned.len() as u64,
                total_fines: owned.iter().map(|v| v.fine_amount).sum(),
                paid_count: owned
                    .iter()
                    .filter(|v| v.status == ViolationStatus::Paid)
                    .count() as u64,
                pending_count: owned.iter().filter(|v| v.status.is_outstanding()).count()
                    as u64,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.violation_count
            .cmp(&a.violation_count)
            .then_with(|| a.enforcer_name.cmp(&b.enforcer_name))
    });
    rows
}

fn format_recent_line(violation: &Violation) -> RecentViolationLine {
    let time = effective_instant(violation).map_or_else(
        || "--:--".to_string(),
        |instant| {
            instant
                .with_timezone(&engine_offset())
                .format("%H:%M")
                .to_string()
        },
    );
    RecentViolationLine {
        violation_number: violation.violation_number.clone(),
        violator_name: violation.name.clone(),
        violation_type: violation.violation_type.clone(),
        location: violation.location.clone(),
        time,
        amount: format_fine_amount(violation.fine_amount),
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|date| date.pred_opt())
        .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_monthly_report_covers_every_day_of_the_month() -> Result<()> {
        let store = setup_store();
        let config = test_config();

        // April has 30 days; violations only on the 1st and the 15th.
        for day in [1, 1, 15] {
            insert_violation(
                &store,
                ViolationArgs {
                    captured_at: Some(format!("4-{day}-2025 8:00:00")),
                    ..ViolationArgs::default()
                },
            )
            .await?;
        }

        let report = monthly_report(&store, &config, 2025, 4).await?;
        assert_eq!(report.daily_counts.len(), 30);
        assert_eq!(report.total_violations, 3);

        for entry in &report.daily_counts {
            let expected = match entry.date.day() {
                1 => 2,
                15 => 1,
                _ => 0,
            };
            assert_eq!(entry.count, expected, "day {}", entry.date);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_report_rejects_meaningless_month() {
        let store = setup_store();
        let config = test_config();
        let result = monthly_report(&store, &config, 2025, 13).await;
        assert!(matches!(
            result,
            Err(crate::errors::Error::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_undated_records_are_excluded_from_buckets() -> Result<()> {
        let store = setup_store();
        let config = test_config();

        insert_violation(
            &store,
            ViolationArgs {
                captured_at: Some("4-10-2025 8:00:00".to_string()),
                ..ViolationArgs::default()
            },
        )
        .await?;
        // No capture time and an explicitly null createdAt: unresolvable.
        insert_undated_violation(&store).await?;

        let report = monthly_report(&store, &config, 2025, 4).await?;
        assert_eq!(report.total_violations, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_summary_includes_zero_activity_enforcers() -> Result<()> {
        let store = setup_store();
        let config = test_config();
        let date = chrono::NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();

        let active = create_test_enforcer(&store, "Maria Santos", "E-104").await?;
        let idle = create_test_enforcer(&store, "Pedro Reyes", "E-105").await?;
        let inactive = create_custom_enforcer(&store, "Gone Girl", "E-900", false).await?;

        for (status, fine, time) in [("paid", 500.0, "9:30:00"), ("pending", 300.0, "9:45:00")] {
            insert_violation(
                &store,
                ViolationArgs {
                    enforcer_id: Some(active.id.clone()),
                    status: status.to_string(),
                    fine_amount: fine,
                    captured_at: Some(format!("8-6-2025 {time}")),
                    violation_type: "illegal parking".to_string(),
                    ..ViolationArgs::default()
                },
            )
            .await?;
        }
        // A violation on another day must not leak in.
        insert_violation(
            &store,
            ViolationArgs {
                enforcer_id: Some(active.id.clone()),
                captured_at: Some("8-5-2025 9:30:00".to_string()),
                ..ViolationArgs::default()
            },
        )
        .await?;

        let summary = daily_summary(&store, &config, date).await?;
        assert_eq!(summary.total_violations, 2);
        assert_eq!(summary.total_fines, 800.0);
        assert_eq!(summary.enforcer_activity.len(), 2);

        let row = |id: &str| {
            summary
                .enforcer_activity
                .iter()
                .find(|r| r.enforcer_id == id)
                .unwrap()
                .clone()
        };
        assert_eq!(row(&active.id).violation_count, 2);
        assert_eq!(row(&active.id).paid_count, 1);
        assert_eq!(row(&active.id).pending_count, 1);
        assert_eq!(row(&idle.id).violation_count, 0);
        assert!(
            !summary
                .enforcer_activity
                .iter()
                .any(|r| r.enforcer_id == inactive.id)
        );

        let parking = &summary.type_breakdown["illegal parking"];
        assert_eq!(parking.count, 2);
        assert_eq!(parking.total_fines, 800.0);
        assert_eq!(parking.average_fine, 400.0);

        assert_eq!(summary.recent_violations.len(), 2);
        assert_eq!(summary.recent_violations[0].time, "09:45");
        assert_eq!(summary.recent_violations[0].amount, "₱300.00");
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_trend_spans_six_months_and_recent_is_enriched() -> Result<()> {
        let store = setup_store();
        let config = test_config();
        let enforcer = create_test_enforcer(&store, "Maria Santos", "E-104").await?;

        // Two in June, one in August, one outside the window (January).
        for captured in [
            "6-10-2025 8:00:00",
            "6-20-2025 8:00:00",
            "8-6-2025 8:00:00",
            "1-5-2025 8:00:00",
        ] {
            insert_violation(
                &store,
                ViolationArgs {
                    enforcer_id: Some(enforcer.id.clone()),
                    status: "paid".to_string(),
                    fine_amount: 100.0,
                    captured_at: Some(captured.to_string()),
                    ..ViolationArgs::default()
                },
            )
            .await?;
        }

        let now = crate::core::temporal::normalize(&crate::core::temporal::RawTimestamp::Text(
            "2025-08-06T12:00:00+08:00".to_string(),
        ))
        .unwrap();
        let snapshot = dashboard_snapshot(&store, &config, now).await?;

        assert_eq!(snapshot.total_violations, 4);
        assert_eq!(snapshot.monthly_trend.len(), TREND_MONTHS as usize);
        assert_eq!(snapshot.monthly_trend[0].month, "2025-03");
        assert_eq!(snapshot.monthly_trend[5].month, "2025-08");

        let june = snapshot
            .monthly_trend
            .iter()
            .find(|point| point.month == "2025-06")
            .unwrap();
        assert_eq!(june.violation_count, 2);
        assert_eq!(june.collected_fines, 200.0);
        // January sits outside the trailing window.
        assert!(!snapshot.monthly_trend.iter().any(|p| p.month == "2025-01"));

        assert_eq!(snapshot.recent_violations.len(), 4);
        assert_eq!(snapshot.recent_violations[0].enforcer_name, "Maria Santos");
        assert_eq!(snapshot.top_enforcers.len(), 1);
        assert_eq!(snapshot.top_enforcers[0].violation_count, 4);

        assert_eq!(snapshot.status_counts.len(), 1);
        assert_eq!(snapshot.status_counts[&ViolationStatus::Paid], 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_enforcer_performance_rates_and_zero_division() -> Result<()> {
        let store = setup_store();
        let config = test_config();
        let busy = create_test_enforcer(&store, "Maria Santos", "E-104").await?;
        let idle = create_test_enforcer(&store, "Pedro Reyes", "E-105").await?;

        for (status, fine, captured) in [
            ("paid", 300.0, "8-6-2025 9:00:00"),
            ("paid", 200.0, "8-1-2025 9:00:00"),
            ("issued", 500.0, "7-15-2025 9:00:00"),
        ] {
            insert_violation(
                &store,
                ViolationArgs {
                    enforcer_id: Some(busy.id.clone()),
                    status: status.to_string(),
                    fine_amount: fine,
                    captured_at: Some(captured.to_string()),
                    ..ViolationArgs::default()
                },
            )
            .await?;
        }

        let now = crate::core::temporal::normalize(&crate::core::temporal::RawTimestamp::Text(
            "2025-08-06T18:00:00+08:00".to_string(),
        ))
        .unwrap();
        let rows = enforcer_performance(&store, &config, now).await?;
        assert_eq!(rows.len(), 2);

        let top = &rows[0];
        assert_eq!(top.enforcer_id, busy.id);
        assert_eq!(top.violation_count, 3);
        assert_eq!(top.total_fines, 1000.0);
        assert_eq!(top.collected_fines, 500.0);
        assert_eq!(top.pending_fines, 500.0);
        assert_eq!(top.collection_rate, 50.0);
        assert_eq!(top.avg_fine_amount, 1000.0 / 3.0);
        assert_eq!(top.today_count, 1);
        assert_eq!(top.month_count, 2);

        let empty = &rows[1];
        assert_eq!(empty.enforcer_id, idle.id);
        assert_eq!(empty.violation_count, 0);
        assert_eq!(empty.collection_rate, 0.0);
        assert_eq!(empty.avg_fine_amount, 0.0);
        Ok(())
    }
}
