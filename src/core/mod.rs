//! Core engine logic - framework-agnostic filtering, sorting, grouping,
//! rollup and enrichment operations over fetched record snapshots.
//!
//! Everything here returns structured data for the presentation layer to
//! format; nothing prescribes a wire format.

pub mod enrich;
pub mod filter;
pub mod offenders;
pub mod paginate;
pub mod rollup;
pub mod temporal;
pub mod violations;

pub use enrich::attach_actor_names;
pub use filter::Predicates;
pub use offenders::{RepeatOffenderReport, find_repeat_offenders, repeat_offender_report};
pub use paginate::{Page, PageRequest, SortDirection, SortKey, paginate};
pub use rollup::{
    DashboardSnapshot, DailySummary, EnforcerPerformance, MonthlyReport, daily_summary,
    dashboard_snapshot, enforcer_performance, monthly_report,
};
pub use temporal::{NormalizeError, RawTimestamp, effective_instant, normalize};
pub use violations::{ListQuery, NewViolation, create_violation, list_violations};
