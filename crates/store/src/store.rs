//! Object store trait and implementations.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use signup_core::{Kind, LabelSelector, Object, ObjectKey};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Trait for object storage backends.
///
/// Every call is a fresh read or write of current state; implementations own
/// no caches the caller can observe.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object by kind and key. `None` when absent.
    async fn get(&self, kind: Kind, key: &ObjectKey) -> Result<Option<Object>>;

    /// List objects of `kind` in `namespace` whose labels match `selector`,
    /// ordered by name.
    async fn list_by_label(
        &self,
        kind: Kind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>>;

    /// Create an object. Fails with `AlreadyExists` when the key is taken.
    async fn create(&self, object: Object) -> Result<Object>;

    /// Persist the status of an object, returning the stored copy.
    async fn update_status(&self, object: Object) -> Result<Object>;
}

/// In-memory object store for testing and local runs.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<(Kind, ObjectKey), Object>>,
}

impl InMemoryObjectStore {
    /// Create a new in-memory object store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new in-memory object store wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or overwrite objects as-is, bypassing create semantics.
    pub async fn seed(&self, objects: impl IntoIterator<Item = Object> + Send) {
        let mut stored = self.objects.write().await;
        for mut object in objects {
            let meta = object.meta_mut();
            meta.resource_version = meta.resource_version.max(1);
            stored.insert((object.kind(), object.key()), object);
        }
    }

    /// Every stored object, ordered by kind then key.
    pub async fn snapshot(&self) -> Vec<Object> {
        self.objects.read().await.values().cloned().collect()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, kind: Kind, key: &ObjectKey) -> Result<Option<Object>> {
        let objects = self.objects.read().await;
        Ok(objects.get(&(kind, key.clone())).cloned())
    }

    async fn list_by_label(
        &self,
        kind: Kind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|((k, key), object)| {
                *k == kind && key.namespace == namespace && selector.matches(&object.meta().labels)
            })
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn create(&self, mut object: Object) -> Result<Object> {
        let kind = object.kind();
        let key = object.key();

        let mut objects = self.objects.write().await;
        if objects.contains_key(&(kind, key.clone())) {
            return Err(Error::already_exists(kind, key));
        }

        object.meta_mut().resource_version = 1;
        objects.insert((kind, key), object.clone());
        Ok(object)
    }

    async fn update_status(&self, object: Object) -> Result<Object> {
        let kind = object.kind();
        let key = object.key();

        let mut objects = self.objects.write().await;
        let stored = objects
            .get_mut(&(kind, key.clone()))
            .ok_or_else(|| Error::not_found(kind, key.clone()))?;

        let expected = object.meta().resource_version;
        let actual = stored.meta().resource_version;
        if expected != actual {
            return Err(Error::conflict(kind, key, expected, actual));
        }

        match (stored, object) {
            (Object::SignupRequest(stored), Object::SignupRequest(incoming)) => {
                stored.status = incoming.status;
                stored.meta.resource_version = actual.saturating_add(1);
                Ok(Object::SignupRequest(stored.clone()))
            }
            _ => Err(Error::unsupported("update_status", kind)),
        }
    }
}

/// A wrapper that adds tracing to an object store.
pub struct TracingObjectStore<S: ObjectStore> {
    inner: S,
}

impl<S: ObjectStore> TracingObjectStore<S> {
    /// Create a new tracing object store.
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped store.
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ObjectStore> ObjectStore for TracingObjectStore<S> {
    async fn get(&self, kind: Kind, key: &ObjectKey) -> Result<Option<Object>> {
        tracing::debug!(%kind, %key, "Getting object");
        let result = self.inner.get(kind, key).await;
        if let Ok(None) = result {
            tracing::trace!(%kind, %key, "Object not found");
        }
        result
    }

    async fn list_by_label(
        &self,
        kind: Kind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>> {
        tracing::debug!(%kind, namespace, %selector, "Listing objects");
        self.inner.list_by_label(kind, namespace, selector).await
    }

    async fn create(&self, object: Object) -> Result<Object> {
        tracing::debug!(kind = %object.kind(), key = %object.key(), "Creating object");
        let result = self.inner.create(object).await;
        if let Err(ref e) = result {
            tracing::debug!(error = %e, "Create failed");
        }
        result
    }

    async fn update_status(&self, object: Object) -> Result<Object> {
        tracing::debug!(
            kind = %object.kind(),
            key = %object.key(),
            version = object.meta().resource_version,
            "Updating status"
        );
        let result = self.inner.update_status(object).await;
        if let Ok(ref stored) = result {
            tracing::trace!(version = stored.meta().resource_version, "Status updated");
        }
        result
    }
}
