//! `TrafficEngine` - query and aggregation engine for traffic-violation
//! records.
//!
//! This crate sits between a schema-less, equality-only document store and
//! the reporting/admin endpoints of a traffic-violation ticketing system.
//! It synthesizes everything the store cannot express natively: consistent
//! filter/sort/paginate semantics over an unordered document set, repeat-
//! offender grouping, time-bucketed rollups for dashboards and reports, and
//! defensive normalization of the malformed timestamps unreliable field
//! hardware sends.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Engine configuration loading and defaults
pub mod config;
/// Core engine logic - filter, sort, group, rollup, enrich
pub mod core;
/// Record shapes for the collections the engine reads
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Record Store seam and in-memory reference implementation
pub mod store;

#[cfg(test)]
pub mod test_utils;
