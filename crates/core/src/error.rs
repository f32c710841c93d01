//! Core error types for resource model operations.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for resource model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An identity key could not be parsed.
    #[error("invalid identity '{input}': {reason}")]
    InvalidIdentity { input: String, reason: String },

    /// A kind name was not recognized.
    #[error("unknown resource kind '{kind}'")]
    UnknownKind { kind: String },
}

impl Error {
    /// Create an invalid identity error.
    pub fn invalid_identity(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown kind error.
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }
}
