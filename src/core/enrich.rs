//! Enrichment - resolving enforcer references to display names.
//!
//! The store has no batch-get and no joins, so enrichment fans the point
//! lookups out concurrently, one per *distinct* enforcer id in the batch.
//! Every failure mode - no reference, reference to a deleted user, or a
//! store fault on the lookup itself - degrades to the same placeholder
//! values, so consumers never branch on whether enrichment succeeded and a
//! broken lookup never fails the surrounding report.

use crate::entities::{EnrichedViolation, User, Violation};
use crate::store::{RecordStore, USERS};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Placeholder used when an actor cannot be resolved.
pub const UNKNOWN_ACTOR: &str = "Unknown";

/// Attaches enforcer name and badge to each violation.
///
/// Lookups are issued concurrently across the batch's distinct enforcer
/// ids. This function never returns an error: store faults are logged and
/// absorbed into placeholders.
pub async fn attach_actor_names(
    store: &dyn RecordStore,
    violations: Vec<Violation>,
) -> Vec<EnrichedViolation> {
    let ids: Vec<String> = violations
        .iter()
        .filter_map(|violation| violation.enforcer_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let lookups = join_all(
        ids.iter()
            .map(|id| async move { (id.clone(), store.find_by_id(USERS, id).await) }),
    )
    .await;

    let mut resolved: HashMap<String, (String, String)> = HashMap::new();
    for (id, outcome) in lookups {
        match outcome {
            Ok(Some(document)) => match serde_json::from_value::<User>(document) {
                Ok(user) => {
                    resolved.insert(id, (user.full_name, user.badge_number));
                }
                Err(error) => {
                    warn!(%id, %error, "malformed user document during enrichment");
                }
            },
            Ok(None) => {
                warn!(%id, "enforcer reference does not resolve");
            }
            Err(error) => {
                warn!(%id, %error, "enforcer lookup failed, using placeholder");
            }
        }
    }

    violations
        .into_iter()
        .map(|violation| {
            let (enforcer_name, enforcer_badge) = violation
                .enforcer_id
                .as_ref()
                .and_then(|id| resolved.get(id).cloned())
                .unwrap_or_else(|| (UNKNOWN_ACTOR.to_string(), UNKNOWN_ACTOR.to_string()));
            EnrichedViolation {
                violation,
                enforcer_name,
                enforcer_badge,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::{Error, Result};
    use crate::store::{EqualityFilters, MemoryStore};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    fn referencing(enforcer_id: Option<&str>) -> Violation {
        Violation {
            enforcer_id: enforcer_id.map(str::to_string),
            ..Violation::default()
        }
    }

    #[tokio::test]
    async fn test_resolves_existing_actor() -> Result<()> {
        let store = MemoryStore::new();
        let user = store
            .create(
                USERS,
                json!({"fullName": "Maria Santos", "badgeNumber": "E-104", "role": "enforcer"}),
            )
            .await?;
        let id = user.get("id").and_then(Value::as_str).unwrap();

        let enriched = attach_actor_names(&store, vec![referencing(Some(id))]).await;
        assert_eq!(enriched[0].enforcer_name, "Maria Santos");
        assert_eq!(enriched[0].enforcer_badge, "E-104");
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_actor_falls_back_to_unknown() {
        let store = MemoryStore::new();
        let enriched = attach_actor_names(&store, vec![referencing(Some("gone"))]).await;
        assert_eq!(enriched[0].enforcer_name, UNKNOWN_ACTOR);
        assert_eq!(enriched[0].enforcer_badge, UNKNOWN_ACTOR);
    }

    #[tokio::test]
    async fn test_missing_reference_gets_the_same_placeholder() {
        let store = MemoryStore::new();
        let enriched = attach_actor_names(&store, vec![referencing(None)]).await;
        assert_eq!(enriched[0].enforcer_name, UNKNOWN_ACTOR);
    }

    /// Store double whose lookups always fault.
    struct FaultingStore;

    #[async_trait]
    impl RecordStore for FaultingStore {
        async fn create(&self, _: &str, _: Value) -> Result<Value> {
            Err(store_down())
        }
        async fn find_by_id(&self, _: &str, _: &str) -> Result<Option<Value>> {
            Err(store_down())
        }
        async fn find_one(&self, _: &str, _: &str, _: &Value) -> Result<Option<Value>> {
            Err(store_down())
        }
        async fn find_many(
            &self,
            _: &str,
            _: &EqualityFilters,
            _: Option<usize>,
        ) -> Result<Vec<Value>> {
            Err(store_down())
        }
        async fn update(&self, _: &str, _: &str, _: Value) -> Result<Value> {
            Err(store_down())
        }
        async fn delete(&self, _: &str, _: &str) -> Result<bool> {
            Err(store_down())
        }
        async fn count(&self, _: &str, _: &EqualityFilters) -> Result<u64> {
            Err(store_down())
        }
    }

    fn store_down() -> Error {
        Error::Store {
            message: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_fault_degrades_instead_of_failing() {
        let enriched =
            attach_actor_names(&FaultingStore, vec![referencing(Some("u-1"))]).await;
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].enforcer_name, UNKNOWN_ACTOR);
    }
}
