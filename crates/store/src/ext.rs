//! Typed access on top of any object store.

use async_trait::async_trait;
use signup_core::{LabelSelector, ObjectKey, Resource};

use crate::error::{Error, Result};
use crate::store::ObjectStore;

/// Typed helpers over [`ObjectStore`]. Implemented for every store.
#[async_trait]
pub trait ResourceStoreExt: ObjectStore {
    /// Fetch a typed resource. `None` when absent.
    async fn get_resource<R: Resource>(&self, key: &ObjectKey) -> Result<Option<R>> {
        self.get(R::KIND, key)
            .await?
            .map(|object| R::from_object(object).ok_or_else(|| Error::kind_mismatch(R::KIND, key.clone())))
            .transpose()
    }

    /// List typed resources by label within a namespace.
    async fn list_resources<R: Resource>(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<R>> {
        self.list_by_label(R::KIND, namespace, selector)
            .await?
            .into_iter()
            .map(|object| {
                let key = object.key();
                R::from_object(object).ok_or_else(|| Error::kind_mismatch(R::KIND, key))
            })
            .collect()
    }

    /// Create a typed resource, returning the stored copy.
    async fn create_resource<R: Resource>(&self, resource: R) -> Result<R> {
        let key = resource.meta().key();
        let stored = self.create(resource.into_object()).await?;
        R::from_object(stored).ok_or_else(|| Error::kind_mismatch(R::KIND, key))
    }

    /// Persist a typed resource's status, returning the stored copy.
    async fn update_resource_status<R: Resource>(&self, resource: R) -> Result<R> {
        let key = resource.meta().key();
        let stored = self.update_status(resource.into_object()).await?;
        R::from_object(stored).ok_or_else(|| Error::kind_mismatch(R::KIND, key))
    }
}

impl<S: ObjectStore + ?Sized> ResourceStoreExt for S {}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use signup_core::{ConfigRecord, Kind, ObjectKey, SignupRequest, TemplateTier};

    use super::*;
    use crate::store::InMemoryObjectStore;

    #[tokio::test]
    async fn test_typed_round_trip_through_dyn_store() {
        let store: Arc<dyn ObjectStore> = InMemoryObjectStore::new_arc();
        let key = ObjectKey::new("host", "basic");

        store
            .create_resource(TemplateTier::new(&key, [("dev", "r1")]))
            .await
            .unwrap();

        let tier: Option<TemplateTier> = store.get_resource(&key).await.unwrap();
        assert_eq!(tier.map(|t| t.spec.namespaces.len()), Some(1));

        let missing: Option<ConfigRecord> = store.get_resource(&key).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_resource_status_returns_typed_copy() {
        let store = InMemoryObjectStore::new();
        let key = ObjectKey::new("host", "john");
        let created = store
            .create_resource(SignupRequest::new(&key, "john"))
            .await
            .unwrap();

        let updated = store.update_resource_status(created).await.unwrap();
        assert_eq!(updated.meta.resource_version, 2);
        assert_eq!(updated.key(), key);
        assert_eq!(Kind::SignupRequest, <SignupRequest as Resource>::KIND);
    }
}
