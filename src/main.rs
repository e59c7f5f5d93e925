//! Demo runner: wires the engine to an in-memory store, seeds a handful of
//! records through the creation path and prints the reports it computes.

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;
use traffic_engine::config;
use traffic_engine::core::{
    NewViolation, create_violation, dashboard_snapshot, enforcer_performance,
    repeat_offender_report,
};
use traffic_engine::errors::Result;
use traffic_engine::store::{MemoryStore, RecordStore, USERS};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the engine configuration
    let engine_config = config::load_default_config()?;
    info!(?engine_config, "engine configuration loaded");

    // 4. Stand up a store and seed demo records through the creation path
    let store = MemoryStore::new();
    let enforcer = store
        .create(
            USERS,
            serde_json::json!({
                "fullName": "Maria Santos",
                "badgeNumber": "E-104",
                "role": "enforcer",
                "isActive": true,
            }),
        )
        .await?;
    let enforcer_id = enforcer
        .get("id")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);

    for (plate, name, violation_type, fine, captured) in [
        ("ABC 1234", "Juan Dela Cruz", "overspeeding", 1500.0, "8-4-2025 9:15:00"),
        ("ABC 1234", "Juan Dela Cruz", "illegal parking", 500.0, "8-5-2025 14:05:00"),
        ("ABC 1234", "Juan Dela Cruz", "no helmet", 300.0, "8-6-2025 7:50:00"),
        ("XYZ 9876", "Maria Clara", "illegal parking", 500.0, "8-6-2025 11:40:00"),
    ] {
        create_violation(
            &store,
            &engine_config,
            NewViolation {
                enforcer_id: enforcer_id.clone(),
                name: name.to_string(),
                plate: plate.to_string(),
                violation_type: violation_type.to_string(),
                fine_amount: fine,
                location: "Session Road".to_string(),
                captured_at: Some(captured.to_string()),
                ..NewViolation::default()
            },
        )
        .await?;
    }

    // 5. Run the reports
    let now = chrono::Utc::now();
    let dashboard = dashboard_snapshot(&store, &engine_config, now).await?;
    info!(
        total = dashboard.total_violations,
        fines = dashboard.total_fines,
        "dashboard snapshot computed"
    );
    for point in &dashboard.monthly_trend {
        info!(month = %point.month, count = point.violation_count, "trend");
    }

    let offenders = repeat_offender_report(&store, &engine_config, None).await?;
    for summary in &offenders.summaries {
        info!(
            identity = %summary.identity_key,
            count = summary.violation_count,
            total = summary.total_fines,
            "repeat offender"
        );
    }

    let performance = enforcer_performance(&store, &engine_config, now).await?;
    for row in &performance {
        info!(
            enforcer = %row.enforcer_name,
            count = row.violation_count,
            rate = row.collection_rate,
            "enforcer performance"
        );
    }

    Ok(())
}
