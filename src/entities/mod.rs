//! Entity module - record shapes for the collections the engine reads.
//!
//! These are plain serde structs mirroring the store's JSON documents, not
//! ORM models: the store is schema-less and documents are decoded
//! defensively, one record at a time.

pub mod user;
pub mod violation;

pub use user::{Role, User};
pub use violation::{EnrichedViolation, Violation, ViolationStatus};
