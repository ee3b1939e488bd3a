//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where descriptor parsing can fail inside them.

use thiserror::Error;

/// The error type for `pf-core` parsing and validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A region descriptor had an unknown `type`, a missing field, or
    /// out-of-range coordinates.
    #[error("invalid region descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `pf-core`.
pub type CoreResult<T> = Result<T, CoreError>;
