//! K8s-style reconciliation for user signups.
//!
//! [`SignupReconciler::reconcile`] is the single entry point. Every call
//! re-reads the store and moves one signup request a step closer to its
//! account record:
//!
//! 1. Finds any account record already labelled with the signup's identity
//!    and marks the signup complete
//! 2. Reads the namespace approval policy
//! 3. Picks a member cluster and the template tier
//! 4. Allocates a compliant name and creates the account record
//!
//! Status writes go through [`StatusUpdate`], and every failure path records
//! its reason on the signup before the error is returned.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use signup_core::ObjectKey;
//! use signup_reconciler::{ReconcilerBuilder, StaticClusterSelector};
//! use signup_store::InMemoryObjectStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let reconciler = ReconcilerBuilder::new()
//!         .with_store(InMemoryObjectStore::new_arc())
//!         .with_clusters(Arc::new(StaticClusterSelector::new(["member-1"])))
//!         .build()
//!         .unwrap();
//!
//!     let result = reconciler.reconcile(&ObjectKey::new("host", "john")).await;
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod approval;
pub mod cluster;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod status;
pub mod types;
pub mod username;

// Re-export main types
pub use approval::{ApprovalPolicy, ApprovalPolicyReader};
pub use cluster::{ClusterRegistry, ClusterSelector, MemberCluster, StaticClusterSelector};
pub use config::ReconcilerConfig;
pub use error::{Error, Result};
pub use reconciler::{ReconcilerBuilder, SignupReconciler};
pub use status::StatusUpdate;
pub use types::{requeue_requested, ReconcileResult};
pub use username::{AllocationError, UsernameAllocator};
