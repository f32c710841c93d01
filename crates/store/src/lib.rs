//! Versioned object store for signup provisioning.
//!
//! The reconciler talks to its backing store only through [`ObjectStore`]:
//!
//! - `get` by kind and key
//! - `list_by_label` within a namespace
//! - `create`, failing when the key is taken
//! - `update_status` with optimistic concurrency on `resource_version`
//!
//! [`ResourceStoreExt`] layers typed access on top of any store.
//! [`InMemoryObjectStore`] backs tests and local runs;
//! [`TracingObjectStore`] logs every call.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod error;
pub mod ext;
pub mod store;

// Re-export main types
pub use error::{Error, Result};
pub use ext::ResourceStoreExt;
pub use store::{InMemoryObjectStore, ObjectStore, TracingObjectStore};
