//! Violation entity - the central record of the system.
//!
//! Field names follow the store's JSON documents (camelCase); `type` is
//! renamed to `violation_type` on the Rust side. Violator and vehicle facts
//! are plain strings that default to empty when the document omits them,
//! because device-submitted documents routinely do. Temporal fields stay in
//! their raw document shape ([`RawTimestamp`]) until the normalizer resolves
//! them at the point of use.

use crate::core::temporal::RawTimestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a violation.
///
/// `Pending` is the initial state; `Paid` and `Cancelled` are terminal;
/// `Disputed` is a detour that can return to `Issued` or `Paid`. Transitions
/// are driven externally by admin/enforcer action - the engine only reads
/// the status, it never enforces the transition graph.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViolationStatus {
    /// Freshly recorded, not yet issued to the violator.
    #[default]
    Pending,
    /// Issued and awaiting payment.
    Issued,
    /// Fine collected.
    Paid,
    /// Contested by the violator.
    Disputed,
    /// Voided by an admin.
    Cancelled,
}

impl ViolationStatus {
    /// Status as it appears in stored documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Issued => "issued",
            Self::Paid => "paid",
            Self::Disputed => "disputed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the fine still counts toward a violator's outstanding total
    /// (pending or issued).
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Issued)
    }
}

impl fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violation record as stored in the `violations` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Violation {
    /// Store-assigned identifier.
    pub id: String,
    /// Human-facing number, format `VIO-YYYYMMDD-NNNN`.
    pub violation_number: String,
    /// Owning enforcer; None for device-submitted records.
    pub enforcer_id: Option<String>,

    /// Violator's name.
    pub name: String,
    /// Violator's driver's license number.
    pub license: String,
    /// Violator's phone number.
    pub phone: String,
    /// Violator's address.
    pub address: String,

    /// Vehicle plate number.
    pub plate: String,
    /// Vehicle model.
    pub model: String,
    /// Vehicle color.
    pub color: String,

    /// Violation type (e.g. "illegal parking", "no helmet").
    #[serde(rename = "type")]
    pub violation_type: String,
    /// Free-form description.
    pub description: String,
    /// Where the violation was recorded.
    pub location: String,
    /// Fine in pesos; non-negative.
    pub fine_amount: f64,
    /// Lifecycle status; read-only to the engine.
    pub status: ViolationStatus,

    /// Store-assigned creation time.
    pub created_at: Option<RawTimestamp>,
    /// Device-reported capture time; may be malformed.
    pub captured_at: Option<RawTimestamp>,
    /// Admin-entered event time.
    pub occurred_at: Option<RawTimestamp>,
    /// Settlement deadline, derived at creation.
    pub due_date: Option<RawTimestamp>,
    /// Set when status becomes paid.
    pub paid_at: Option<RawTimestamp>,

    /// Repeat-offender flag as of issuance. This is a snapshot: it is
    /// computed once when the record is created and never recomputed, so it
    /// can lag behind the on-demand repeat-offender report once the violator
    /// accumulates further violations.
    pub is_repeat_offender: bool,
    /// Number of prior violations for the same violator as of issuance.
    pub previous_violations_count: u32,
}

/// A violation with its enforcer reference resolved to display values.
///
/// Every record gets the same shape: records whose enforcer is missing,
/// deleted, or unresolvable carry the `"Unknown"` placeholders, so consumers
/// never branch on whether enrichment succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedViolation {
    /// The underlying violation record.
    #[serde(flatten)]
    pub violation: Violation,
    /// Resolved enforcer full name, or "Unknown".
    pub enforcer_name: String,
    /// Resolved enforcer badge number, or "Unknown".
    pub enforcer_badge: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_camel_case_document() {
        let doc = json!({
            "id": "000001",
            "violationNumber": "VIO-20250806-1234",
            "enforcerId": "u-1",
            "name": "Juan Dela Cruz",
            "license": "N01-23-456789",
            "plate": "ABC 1234",
            "type": "overspeeding",
            "fineAmount": 1500.0,
            "status": "issued",
            "createdAt": "2025-08-06T10:00:00+08:00",
            "capturedAt": "8-6-2025 9:45:00",
            "isRepeatOffender": true,
            "previousViolationsCount": 2
        });

        let violation: Violation = serde_json::from_value(doc).unwrap();
        assert_eq!(violation.violation_number, "VIO-20250806-1234");
        assert_eq!(violation.violation_type, "overspeeding");
        assert_eq!(violation.status, ViolationStatus::Issued);
        assert!(violation.is_repeat_offender);
        assert_eq!(violation.previous_violations_count, 2);
        // Omitted fields default rather than failing the record.
        assert_eq!(violation.phone, "");
        assert_eq!(violation.occurred_at, None);
    }

    #[test]
    fn test_unknown_status_fails_the_record() {
        let doc = json!({ "status": "archived" });
        assert!(serde_json::from_value::<Violation>(doc).is_err());
    }

    #[test]
    fn test_status_round_trip_and_outstanding() {
        for status in [
            ViolationStatus::Pending,
            ViolationStatus::Issued,
            ViolationStatus::Paid,
            ViolationStatus::Disputed,
            ViolationStatus::Cancelled,
        ] {
            let text = serde_json::to_string(&status).unwrap();
            assert_eq!(text, format!("\"{status}\""));
        }
        assert!(ViolationStatus::Pending.is_outstanding());
        assert!(ViolationStatus::Issued.is_outstanding());
        assert!(!ViolationStatus::Paid.is_outstanding());
        assert!(!ViolationStatus::Disputed.is_outstanding());
        assert!(!ViolationStatus::Cancelled.is_outstanding());
    }
}
