//! Deterministic sorting and pagination over filtered record sets.
//!
//! The store cannot order or page once any non-equality predicate is in
//! play - a server-side limit would truncate the candidate set before the
//! in-memory predicates ran. So pagination always happens here, after
//! filtering and sorting, over the full candidate set, and `total_records`
//! reflects the post-filter count rather than the store's raw count.

use crate::core::temporal::{effective_instant, normalize};
use crate::entities::Violation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: u32 = 1;
/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Key a record list can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Store-assigned creation time (the default).
    #[default]
    CreatedAt,
    /// The record's effective instant (capture → event → creation priority).
    EffectiveDate,
    /// Fine amount.
    FineAmount,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first (the default).
    #[default]
    Descending,
}

/// A pagination request.
///
/// Out-of-range values are clamped, never rejected: `page_size` to
/// [`MIN_PAGE_SIZE`]..=[`MAX_PAGE_SIZE`], `page` to at least 1. A page past
/// the end yields an empty item list with the totals intact.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Ordering key.
    pub sort_key: SortKey,
    /// Ordering direction.
    pub direction: SortDirection,
    /// 1-based page number.
    pub page: u32,
    /// Records per page.
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            sort_key: SortKey::default(),
            direction: SortDirection::default(),
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// The (clamped) page this slice corresponds to.
    pub current_page: u32,
    /// Total pages at this page size.
    pub total_pages: u32,
    /// Post-filter record count across all pages.
    pub total_records: usize,
}

impl<T> Page<T> {
    /// Maps the page items while keeping the pagination envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_records: self.total_records,
        }
    }
}

/// Sorts records by the requested key.
///
/// Ties - and records whose key does not resolve - are broken by
/// store-assigned id, descending, in both directions, so repeated calls over
/// the same snapshot paginate identically.
pub fn sort_records(records: &mut [Violation], sort_key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| {
        let primary = match sort_key {
            SortKey::CreatedAt => created_instant(a).cmp(&created_instant(b)),
            SortKey::EffectiveDate => effective_instant(a).cmp(&effective_instant(b)),
            SortKey::FineAmount => a.fine_amount.total_cmp(&b.fine_amount),
        };
        let oriented = match direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        oriented.then_with(|| b.id.cmp(&a.id))
    });
}

/// Sorts and slices a filtered record set into one page.
#[must_use]
pub fn paginate(mut records: Vec<Violation>, request: &PageRequest) -> Page<Violation> {
    let page_size = request.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    let page = request.page.max(1);

    sort_records(&mut records, request.sort_key, request.direction);

    let total_records = records.len();
    let total_pages = total_records.div_ceil(page_size as usize) as u32;

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let items: Vec<Violation> = records
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    Page {
        items,
        current_page: page,
        total_pages,
        total_records,
    }
}

fn created_instant(record: &Violation) -> Option<DateTime<Utc>> {
    record.created_at.as_ref().and_then(|raw| normalize(raw).ok())
}

/// Comparator-compatible ordering helper exposed for rollups that need the
/// same newest-first ordering without paging.
#[must_use]
pub fn by_effective_desc(a: &Violation, b: &Violation) -> Ordering {
    effective_instant(b)
        .cmp(&effective_instant(a))
        .then_with(|| b.id.cmp(&a.id))
}
