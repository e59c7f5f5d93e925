//! Record Store seam - the equality-only document store contract.
//!
//! The persistence layer is an external collaborator; the engine consumes it
//! through the [`RecordStore`] trait and is handed an instance explicitly at
//! every entry point (no shared module-level handle, no connect-first
//! coupling). The store can only filter by field equality - everything
//! richer (ordering, ranges, substring search, grouping, pagination) is
//! synthesized in `core` after `find_many` returns.

pub mod memory;

pub use memory::MemoryStore;

use crate::errors::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Collection holding violation documents.
pub const VIOLATIONS: &str = "violations";
/// Collection holding user (enforcer/admin) documents.
pub const USERS: &str = "users";

/// A set of field/value equality conditions the store can apply natively.
///
/// `eq` drops pairs whose value is null or an empty string instead of
/// matching them literally: an absent search-form field means "no
/// constraint", never "match the empty string".
#[derive(Debug, Clone, Default)]
pub struct EqualityFilters {
    entries: Vec<(String, Value)>,
}

impl EqualityFilters {
    /// Creates an empty filter set (matches every document).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition, dropping undefined/empty values.
    #[must_use]
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let defined = match &value {
            Value::Null => false,
            Value::String(text) => !text.is_empty(),
            _ => true,
        };
        if defined {
            self.entries.push((field.to_string(), value));
        }
        self
    }

    /// The retained field/value pairs.
    #[must_use]
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Whether any condition survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The document store capability the engine is parameterized by.
///
/// Documents are JSON objects; once stored they carry `id`, `createdAt` and
/// `updatedAt` fields assigned by the store. All filtering beyond these
/// equality conditions happens in memory after the fetch.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new document, assigning id and creation/update timestamps.
    async fn create(&self, collection: &str, data: Value) -> Result<Value>;

    /// Fetches a document by store-assigned id.
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Fetches the first document whose `field` equals `value`.
    async fn find_one(&self, collection: &str, field: &str, value: &Value)
    -> Result<Option<Value>>;

    /// Fetches documents matching every equality condition, up to `limit`.
    ///
    /// Order is unspecified - the store is an unordered document set and
    /// callers must sort in memory.
    async fn find_many(
        &self,
        collection: &str,
        filters: &EqualityFilters,
        limit: Option<usize>,
    ) -> Result<Vec<Value>>;

    /// Merges `patch` into an existing document and refreshes `updatedAt`.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value>;

    /// Deletes a document; returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    /// Counts documents matching every equality condition.
    async fn count(&self, collection: &str, filters: &EqualityFilters) -> Result<u64>;
}

/// Decodes fetched documents into typed records, skipping malformed ones.
///
/// A document that fails to decode is logged and dropped; it never aborts
/// the batch. Partial results beat failed results whenever the data is
/// merely incomplete.
#[must_use]
pub fn decode_records<T: DeserializeOwned>(collection: &str, documents: Vec<Value>) -> Vec<T> {
    let total = documents.len();
    let mut records = Vec::with_capacity(total);
    for document in documents {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<no id>")
            .to_string();
        match serde_json::from_value::<T>(document) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(collection, %id, %error, "skipping malformed document");
            }
        }
    }
    records
}
