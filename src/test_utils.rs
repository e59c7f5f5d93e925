//! Shared test utilities for the engine.
//!
//! This module provides common helper functions for setting up an in-memory
//! record store and inserting test records with sensible defaults.

use crate::config::EngineConfig;
use crate::entities::{User, Violation};
use crate::errors::Result;
use crate::store::{MemoryStore, RecordStore, USERS, VIOLATIONS};
use serde_json::{Value, json};

/// Creates an empty in-memory record store.
/// This is the standard setup for all integration tests.
pub fn setup_store() -> MemoryStore {
    MemoryStore::new()
}

/// Engine configuration with the built-in defaults.
pub fn test_config() -> EngineConfig {
    EngineConfig::default()
}

/// Field overrides for a directly inserted violation document.
///
/// Defaults describe a plain pending violation with a plate identity and no
/// timestamps beyond the store-assigned `createdAt`.
#[derive(Debug, Clone)]
pub struct ViolationArgs {
    /// Violator name.
    pub name: String,
    /// License number.
    pub license: String,
    /// Vehicle plate.
    pub plate: String,
    /// Violation type.
    pub violation_type: String,
    /// Location.
    pub location: String,
    /// Fine amount.
    pub fine_amount: f64,
    /// Status, as stored ("pending", "paid", ...).
    pub status: String,
    /// Owning enforcer id.
    pub enforcer_id: Option<String>,
    /// Device capture time, stored verbatim.
    pub captured_at: Option<String>,
    /// Explicit creation time; the store stamps "now" when absent.
    pub created_at: Option<String>,
}

impl Default for ViolationArgs {
    fn default() -> Self {
        Self {
            name: "Test Violator".to_string(),
            license: String::new(),
            plate: "TST 0001".to_string(),
            violation_type: "illegal parking".to_string(),
            location: "Main St".to_string(),
            fine_amount: 500.0,
            status: "pending".to_string(),
            enforcer_id: None,
            captured_at: None,
            created_at: None,
        }
    }
}

/// Inserts a violation document directly, bypassing creation-time
/// derivation, so tests control every field.
pub async fn insert_violation(store: &MemoryStore, args: ViolationArgs) -> Result<Violation> {
    let mut document = json!({
        "name": args.name,
        "license": args.license,
        "plate": args.plate,
        "type": args.violation_type,
        "location": args.location,
        "fineAmount": args.fine_amount,
        "status": args.status,
    });
    if let Some(enforcer_id) = args.enforcer_id {
        document["enforcerId"] = json!(enforcer_id);
    }
    if let Some(captured_at) = args.captured_at {
        document["capturedAt"] = json!(captured_at);
    }
    if let Some(created_at) = args.created_at {
        document["createdAt"] = json!(created_at);
    }

    let stored = store.create(VIOLATIONS, document).await?;
    Ok(serde_json::from_value(stored)?)
}

/// Inserts a violation no date-dependent view can resolve: no capture or
/// event time and an explicitly null `createdAt`.
pub async fn insert_undated_violation(store: &MemoryStore) -> Result<Violation> {
    let document = json!({
        "name": "Undated Violator",
        "plate": "UND 0000",
        "fineAmount": 100.0,
        "status": "pending",
        "createdAt": Value::Null,
    });
    let stored = store.create(VIOLATIONS, document).await?;
    Ok(serde_json::from_value(stored)?)
}

/// Creates an active enforcer account.
pub async fn create_test_enforcer(
    store: &MemoryStore,
    full_name: &str,
    badge_number: &str,
) -> Result<User> {
    create_custom_enforcer(store, full_name, badge_number, true).await
}

/// Creates an enforcer account with explicit active flag.
pub async fn create_custom_enforcer(
    store: &MemoryStore,
    full_name: &str,
    badge_number: &str,
    is_active: bool,
) -> Result<User> {
    let stored = store
        .create(
            USERS,
            json!({
                "fullName": full_name,
                "badgeNumber": badge_number,
                "role": "enforcer",
                "isActive": is_active,
            }),
        )
        .await?;
    Ok(serde_json::from_value(stored)?)
}
