//! In-memory Record Store implementation.
//!
//! The reference implementation of the [`RecordStore`] contract, backing the
//! integration tests and the demo binary. Ids are monotonic so assertions on
//! tie-breaking are deterministic; `createdAt` is only stamped when the
//! caller did not supply one, so tests can position records in time.

use super::{EqualityFilters, RecordStore};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-memory, equality-only document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&self) -> String {
        let sequence = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{sequence:06}")
    }
}

fn as_object(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidInput {
            message: format!("document must be a JSON object, got {other}"),
        }),
    }
}

fn matches(document: &Value, filters: &EqualityFilters) -> bool {
    filters
        .entries()
        .iter()
        .all(|(field, value)| document.get(field) == Some(value))
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, collection: &str, data: Value) -> Result<Value> {
        let mut document = as_object(data)?;
        let now = Value::String(Utc::now().to_rfc3339());

        document.insert("id".to_string(), Value::String(self.assign_id()));
        document
            .entry("createdAt".to_string())
            .or_insert_with(|| now.clone());
        document.insert("updatedAt".to_string(), now);

        let stored = Value::Object(document);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| document.get("id").and_then(Value::as_str) == Some(id))
                .cloned()
        }))
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| document.get(field) == Some(value))
                .cloned()
        }))
    }

    async fn find_many(
        &self,
        collection: &str,
        filters: &EqualityFilters,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut matched: Vec<Value> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(limit) = limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value> {
        let patch = as_object(patch)?;
        let mut collections = self.collections.write().await;
        let documents = collections
            .get_mut(collection)
            .ok_or_else(|| Error::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let document = documents
            .iter_mut()
            .find(|document| document.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| Error::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if let Value::Object(fields) = document {
            for (key, value) in patch {
                fields.insert(key, value);
            }
            fields.insert(
                "updatedAt".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        Ok(document.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|document| document.get("id").and_then(Value::as_str) != Some(id));
        Ok(documents.len() < before)
    }

    async fn count(&self, collection: &str, filters: &EqualityFilters) -> Result<u64> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, filters))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }
}
