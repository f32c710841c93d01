//! Error types for the store crate.

use signup_core::{Kind, ObjectKey};
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Object store error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No object of this kind at this key.
    #[error("{kind} '{key}' not found")]
    NotFound { kind: Kind, key: ObjectKey },

    /// An object of this kind already exists at this key.
    #[error("{kind} '{key}' already exists")]
    AlreadyExists { kind: Kind, key: ObjectKey },

    /// The caller's copy is stale.
    #[error("{kind} '{key}' was modified: expected version {expected}, found {actual}")]
    Conflict {
        kind: Kind,
        key: ObjectKey,
        expected: u64,
        actual: u64,
    },

    /// The stored object is not of the requested kind.
    #[error("object '{key}' is not a {expected}")]
    KindMismatch { expected: Kind, key: ObjectKey },

    /// The operation is not defined for this kind.
    #[error("operation '{operation}' is not supported for {kind}")]
    Unsupported { operation: String, kind: Kind },

    /// The backing store failed.
    #[error("store operation '{operation}' failed: {reason}")]
    Backend { operation: String, reason: String },
}

impl Error {
    /// Create a not found error.
    pub const fn not_found(kind: Kind, key: ObjectKey) -> Self {
        Self::NotFound { kind, key }
    }

    /// Create an already exists error.
    pub const fn already_exists(kind: Kind, key: ObjectKey) -> Self {
        Self::AlreadyExists { kind, key }
    }

    /// Create a conflict error.
    pub const fn conflict(kind: Kind, key: ObjectKey, expected: u64, actual: u64) -> Self {
        Self::Conflict {
            kind,
            key,
            expected,
            actual,
        }
    }

    /// Create a kind mismatch error.
    pub const fn kind_mismatch(expected: Kind, key: ObjectKey) -> Self {
        Self::KindMismatch { expected, key }
    }

    /// Create an unsupported operation error.
    pub fn unsupported(operation: impl Into<String>, kind: Kind) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            kind,
        }
    }

    /// Create a backend error.
    pub fn backend(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a not found error.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
