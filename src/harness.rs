//! Drives reconciliation passes over a loaded snapshot.
//!
//! A pass that requests a requeue, or that created an account record, is
//! followed by another pass for the same identity, the way a watch would
//! re-deliver it.

use std::sync::Arc;

use signup_core::{Kind, LabelSelector, ObjectKey};
use signup_reconciler::{requeue_requested, SignupReconciler};
use signup_store::ObjectStore;
use tracing::{info, warn};

/// How reconciling one identity ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub key: ObjectKey,
    /// Passes actually run.
    pub passes: u32,
    /// Whether the last pass asked for a requeue.
    pub requeue: bool,
    /// Error from the last pass, if any.
    pub error: Option<String>,
}

impl Outcome {
    /// Whether the last pass succeeded.
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs reconciliation passes against a shared store.
pub struct Harness {
    reconciler: SignupReconciler,
    store: Arc<dyn ObjectStore>,
    max_passes: u32,
}

impl Harness {
    /// Create a harness running at most `max_passes` passes per identity.
    pub fn new(reconciler: SignupReconciler, store: Arc<dyn ObjectStore>, max_passes: u32) -> Self {
        Self {
            reconciler,
            store,
            max_passes,
        }
    }

    /// Reconcile every key in order.
    pub async fn run(&self, keys: &[ObjectKey]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(keys.len());
        for key in keys {
            outcomes.push(self.reconcile(key).await);
        }
        outcomes
    }

    /// Reconcile one identity until it settles or the pass limit is hit.
    pub async fn reconcile(&self, key: &ObjectKey) -> Outcome {
        let mut outcome = Outcome {
            key: key.clone(),
            passes: 0,
            requeue: false,
            error: None,
        };

        while outcome.passes < self.max_passes {
            outcome.passes += 1;
            let before = self.account_records(&key.namespace).await;

            let result = self.reconciler.reconcile(key).await;
            outcome.requeue = requeue_requested(&result);
            outcome.error = result.err().map(|e| e.to_string());

            let created = self.account_records(&key.namespace).await > before;

            match &outcome.error {
                Some(error) => warn!(%key, pass = outcome.passes, requeue = outcome.requeue, %error, "Reconciliation failed"),
                None => info!(%key, pass = outcome.passes, created, "Reconciliation succeeded"),
            }

            if !outcome.requeue && !created {
                break;
            }
        }

        outcome
    }

    /// Number of account records in `namespace`; zero when listing fails.
    async fn account_records(&self, namespace: &str) -> usize {
        self.store
            .list_by_label(Kind::AccountRecord, namespace, &LabelSelector::new())
            .await
            .map_or(0, |records| records.len())
    }
}
