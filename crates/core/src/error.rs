//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures at the input boundary
/// (timestamps, identifiers). Ledger and infrastructure failures live in the
/// crates that produce them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A timestamp did not match `YYYY-MM-DD HH:MM` or named an impossible date.
    #[error("malformed timestamp '{input}': {reason}")]
    MalformedTimestamp { input: String, reason: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn malformed_timestamp(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
