//! Error types for the reconciler crate.

use std::fmt;

use signup_core::ObjectKey;

use crate::username::AllocationError;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug)]
pub enum Error {
    /// The object store failed.
    Store(signup_store::Error),
    /// No compliant account name could be allocated.
    Allocation(AllocationError),
    /// More than one account record carries the signup's identity label.
    MultipleAccountRecords { identity: ObjectKey, count: usize },
    /// No member cluster is registered and none was requested.
    NoClustersAvailable,
    /// The template tier has not been created yet.
    TemplateTierNotFound { tier: ObjectKey },
    /// An error with caller-supplied context.
    Context { context: String, source: Box<Error> },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Allocation(err) => write!(f, "{err}"),
            Self::MultipleAccountRecords { identity, count } => {
                write!(
                    f,
                    "multiple matching account records found for '{identity}' ({count})"
                )
            }
            Self::NoClustersAvailable => {
                write!(f, "no target clusters available")
            }
            Self::TemplateTierNotFound { tier } => {
                write!(f, "no template tier available: '{tier}' not found")
            }
            Self::Context { context, source } => {
                write!(f, "{context}: {source}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Allocation(err) => Some(err),
            Self::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<signup_store::Error> for Error {
    fn from(err: signup_store::Error) -> Self {
        Self::Store(err)
    }
}

impl From<AllocationError> for Error {
    fn from(err: AllocationError) -> Self {
        Self::Allocation(err)
    }
}

impl Error {
    /// Create a multiple account records error.
    pub const fn multiple_account_records(identity: ObjectKey, count: usize) -> Self {
        Self::MultipleAccountRecords { identity, count }
    }

    /// Create a template tier not found error.
    pub const fn template_tier_not_found(tier: ObjectKey) -> Self {
        Self::TemplateTierNotFound { tier }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Wrap with context. An empty context leaves the error as it is.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let context = context.into();
        if context.is_empty() {
            self
        } else {
            Self::Context {
                context,
                source: Box::new(self),
            }
        }
    }

    /// The innermost error, past any context layers.
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the caller should requeue rather than back off.
    ///
    /// Only a missing template tier qualifies: it is expected to appear
    /// without anything else changing.
    pub fn requeue_requested(&self) -> bool {
        matches!(self.root(), Self::TemplateTierNotFound { .. })
    }
}
