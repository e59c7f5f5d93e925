//! Unified error types and result handling for the engine.
//!
//! Per-record problems (a timestamp that will not parse, a document missing
//! its identity fields) are deliberately *not* represented here: those are
//! absorbed and logged at the site that hits them, per the engine's
//! partial-result policy. Only call-level failures surface as `Error`.

use thiserror::Error;

/// Errors that can terminate an engine call.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or value could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The record store was unreachable or rejected an operation.
    #[error("Record store error: {message}")]
    Store {
        /// Description reported by the store client.
        message: String,
    },

    /// Caller supplied a structurally meaningless input that cannot be
    /// clamped to a valid value.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },

    /// A record referenced by id does not exist.
    #[error("Record not found: {collection}/{id}")]
    NotFound {
        /// Collection the lookup ran against.
        collection: String,
        /// The id that failed to resolve.
        id: String,
    },

    /// I/O error (configuration file reads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error at the document boundary.
    #[error("Document serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
