//! Violation record operations - creation-time derivation and list synthesis.
//!
//! Creation derives the fields the rest of the system treats as facts: the
//! human-facing violation number, the settlement due date, and the
//! issuance-time repeat-offender snapshot. Listing is the admin-console
//! query path: push what the store can do (equality) down, then synthesize
//! the rest (search, ranges, ordering, pages, enrichment) in memory.

use crate::config::EngineConfig;
use crate::core::enrich::attach_actor_names;
use crate::core::filter::{self, Predicates};
use crate::core::offenders::identity_key;
use crate::core::paginate::{self, Page, PageRequest};
use crate::core::temporal::{RawTimestamp, engine_offset, normalize};
use crate::entities::{EnrichedViolation, User, Violation, ViolationStatus};
use crate::errors::{Error, Result};
use crate::store::{EqualityFilters, RecordStore, USERS, VIOLATIONS, decode_records};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Input for recording a new violation.
///
/// Status, numbering, due date and the repeat-offender snapshot are derived
/// here, not supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct NewViolation {
    /// Owning enforcer; None for device submissions.
    pub enforcer_id: Option<String>,
    /// Violator's name.
    pub name: String,
    /// Violator's license number.
    pub license: String,
    /// Violator's phone number.
    pub phone: String,
    /// Violator's address.
    pub address: String,
    /// Vehicle plate.
    pub plate: String,
    /// Vehicle model.
    pub model: String,
    /// Vehicle color.
    pub color: String,
    /// Violation type.
    pub violation_type: String,
    /// Free-form description.
    pub description: String,
    /// Location of the violation.
    pub location: String,
    /// Fine amount; must be non-negative.
    pub fine_amount: f64,
    /// Device-reported capture time, passed through unparsed.
    pub captured_at: Option<String>,
}

/// A list request: store-expressible equality conditions ride in
/// `predicates` too and are pushed down; the rest is applied in memory.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Filter conditions (ANDed).
    pub predicates: Predicates,
    /// Sort and page selection.
    pub page: PageRequest,
}

/// Fetches violations matching the given equality filters, bounded by the
/// configured fetch cap.
///
/// Hitting the cap truncates the candidate set rather than failing; the
/// truncation is logged because every aggregate computed from it is an
/// approximation for very large datasets.
pub(crate) async fn fetch_violations(
    store: &dyn RecordStore,
    config: &EngineConfig,
    filters: &EqualityFilters,
) -> Result<Vec<Violation>> {
    let documents = store
        .find_many(VIOLATIONS, filters, Some(config.max_fetch_records))
        .await?;
    if documents.len() >= config.max_fetch_records {
        warn!(
            cap = config.max_fetch_records,
            "fetch cap reached; results are computed over a truncated candidate set"
        );
    }
    Ok(decode_records(VIOLATIONS, documents))
}

/// Fetches enforcer accounts, keeping only active ones.
///
/// `isActive` is filtered in memory: the store matches equality against
/// fields that exist, and older user documents omit the flag (meaning
/// active).
pub(crate) async fn fetch_active_enforcers(store: &dyn RecordStore) -> Result<Vec<User>> {
    let documents = store
        .find_many(USERS, &EqualityFilters::new().eq("role", "enforcer"), None)
        .await?;
    let users: Vec<User> = decode_records(USERS, documents);
    Ok(users.into_iter().filter(|user| user.is_active).collect())
}

/// Records a new violation, deriving number, due date and repeat snapshot.
///
/// # Errors
/// - [`Error::InvalidInput`] for a negative fine or a record with no
///   violator identity at all (nothing to ever group or follow up on).
/// - [`Error::Store`] when the store rejects the write.
pub async fn create_violation(
    store: &dyn RecordStore,
    config: &EngineConfig,
    input: NewViolation,
) -> Result<Violation> {
    if !input.fine_amount.is_finite() || input.fine_amount < 0.0 {
        return Err(Error::InvalidInput {
            message: format!("fine amount must be non-negative, got {}", input.fine_amount),
        });
    }
    if input.license.trim().is_empty()
        && input.plate.trim().is_empty()
        && input.name.trim().is_empty()
    {
        return Err(Error::InvalidInput {
            message: "violation needs at least one of license, plate or name".to_string(),
        });
    }

    let now = Utc::now();
    let captured_at = input.captured_at.clone().map(RawTimestamp::Text);
    // The capture instant anchors numbering and the due date; an absent or
    // malformed capture time falls back to the creation instant.
    let anchor = captured_at
        .as_ref()
        .and_then(|raw| normalize(raw).ok())
        .unwrap_or(now);

    let violation_number = derive_violation_number(anchor);
    let due_date = anchor + Duration::days(config.compliance_window_days);
    let (previous_count, is_repeat) = repeat_snapshot(store, config, &input).await?;

    let record = Violation {
        id: String::new(),
        violation_number,
        enforcer_id: input.enforcer_id,
        name: input.name,
        license: input.license,
        phone: input.phone,
        address: input.address,
        plate: input.plate,
        model: input.model,
        color: input.color,
        violation_type: input.violation_type,
        description: input.description,
        location: input.location,
        fine_amount: input.fine_amount,
        status: ViolationStatus::Pending,
        created_at: None,
        captured_at,
        occurred_at: None,
        due_date: Some(due_date.into()),
        paid_at: None,
        is_repeat_offender: is_repeat,
        previous_violations_count: previous_count,
    };

    let mut document = serde_json::to_value(&record)?;
    if let Value::Object(fields) = &mut document {
        // The store assigns id and createdAt.
        fields.remove("id");
        fields.remove("createdAt");
    }

    let stored = store.create(VIOLATIONS, document).await?;
    let created: Violation = serde_json::from_value(stored)?;
    info!(
        violation_number = %created.violation_number,
        previous_count, is_repeat, "violation recorded"
    );
    Ok(created)
}

/// Lists violations: equality pushdown, capped fetch, in-memory predicates,
/// deterministic pagination, enrichment of the returned page only.
///
/// A `page_size` of zero means "unspecified" and falls back to the
/// configured default; any other out-of-range value is clamped by the
/// paginator.
pub async fn list_violations(
    store: &dyn RecordStore,
    config: &EngineConfig,
    query: ListQuery,
) -> Result<Page<EnrichedViolation>> {
    // Only conditions the store understands natively are pushed down; the
    // builder drops unset/empty ones.
    let mut pushdown = EqualityFilters::new();
    if let Some(status) = query.predicates.status {
        pushdown = pushdown.eq("status", status.as_str());
    }
    if let Some(enforcer_id) = &query.predicates.enforcer_id {
        pushdown = pushdown.eq("enforcerId", enforcer_id.as_str());
    }
    if let Some(violation_type) = &query.predicates.violation_type {
        pushdown = pushdown.eq("type", violation_type.as_str());
    }

    let fetched = fetch_violations(store, config, &pushdown).await?;
    let fetched_count = fetched.len();

    let narrowed = filter::apply(fetched, &query.predicates);
    debug!(
        fetched = fetched_count,
        matched = narrowed.len(),
        "list candidates narrowed in memory"
    );

    let mut request = query.page;
    if request.page_size == 0 {
        request.page_size = config.default_page_size;
    }
    let page = paginate::paginate(narrowed, &request);

    let enriched_items = attach_actor_names(store, page.items).await;
    Ok(Page {
        items: enriched_items,
        current_page: page.current_page,
        total_pages: page.total_pages,
        total_records: page.total_records,
    })
}

/// Builds the human-facing violation number for a capture instant.
///
/// Format `VIO-YYYYMMDD-NNNN`, date in the engine's fixed offset, `NNNN`
/// the instant's milliseconds-of-day modulo 10000. Two records written in
/// the same millisecond collide; the number is practically unique, not
/// globally unique, and the store id remains the real identity.
fn derive_violation_number(anchor: DateTime<Utc>) -> String {
    let local = anchor.with_timezone(&engine_offset());
    let date_part = local.format("%Y%m%d");
    let millis_of_day = i64::from(local.time().num_seconds_from_midnight()) * 1000
        + i64::from(local.timestamp_subsec_millis());
    format!("VIO-{date_part}-{:04}", millis_of_day % 10_000)
}

/// Computes the issuance-time repeat-offender snapshot.
///
/// Queries the store by the strongest available identity field (license,
/// else plate, else name) - a single equality filter, the only kind the
/// store supports. The snapshot counts violations *before* this one; the
/// flag includes the new record itself when comparing against the
/// configured threshold. It is stored once and never recomputed, so it can
/// diverge from the on-demand repeat-offender report over time.
async fn repeat_snapshot(
    store: &dyn RecordStore,
    config: &EngineConfig,
    input: &NewViolation,
) -> Result<(u32, bool)> {
    let probe = Violation {
        license: input.license.clone(),
        plate: input.plate.clone(),
        name: input.name.clone(),
        ..Violation::default()
    };
    let Some(key) = identity_key(&probe) else {
        return Ok((0, false));
    };
    let field = if !input.license.trim().is_empty() {
        "license"
    } else if !input.plate.trim().is_empty() {
        "plate"
    } else {
        "name"
    };

    let previous = store
        .count(VIOLATIONS, &EqualityFilters::new().eq(field, key.as_str()))
        .await?;
    let previous = u32::try_from(previous).unwrap_or(u32::MAX);
    let is_repeat = (previous as usize + 1) >= config.repeat_offender_min_count;
    Ok((previous, is_repeat))
}
