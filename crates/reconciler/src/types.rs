//! Core types for the reconciler.

use crate::error::Result;

/// What the scheduler should do after a successful reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Run again promptly rather than waiting for the next change.
    pub requeue: bool,
}

impl ReconcileResult {
    /// Nothing more to do until something changes.
    pub const fn done() -> Self {
        Self { requeue: false }
    }

    /// Run again promptly.
    pub const fn requeue() -> Self {
        Self { requeue: true }
    }
}

/// Whether a reconciliation outcome asks for a prompt requeue.
///
/// A failed reconciliation can still ask for one; every other failure is
/// left to the scheduler's backoff.
pub fn requeue_requested(result: &Result<ReconcileResult>) -> bool {
    match result {
        Ok(outcome) => outcome.requeue,
        Err(err) => err.requeue_requested(),
    }
}

#[cfg(test)]
mod tests {
    use signup_core::ObjectKey;

    use super::*;
    use crate::error::Error;

    #[test]
    fn test_requeue_requested() {
        assert!(!requeue_requested(&Ok(ReconcileResult::done())));
        assert!(requeue_requested(&Ok(ReconcileResult::requeue())));
        assert!(requeue_requested(&Err(Error::template_tier_not_found(
            ObjectKey::new("host", "basic")
        ))));
        assert!(!requeue_requested(&Err(Error::NoClustersAvailable)));
    }
}
