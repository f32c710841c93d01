//! Concurrent access to the in-memory store.
//!
//! Creation is the only uniqueness gate the store offers: racing creates for
//! one key must yield exactly one winner, and racing status writes from the
//! same base version must yield exactly one success.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use signup_core::{
    AccountRecord, AccountRecordSpec, ObjectKey, ObjectMeta, Resource, SignupRequest, USER_ID_LABEL,
};
use signup_store::{Error, InMemoryObjectStore, ObjectStore, ResourceStoreExt};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_creates_have_one_winner() {
    let store = InMemoryObjectStore::new_arc();
    let key = ObjectKey::new("host", "john-at-example-com");

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            let key = key.clone();
            tokio::spawn(async move {
                let record = AccountRecord {
                    meta: ObjectMeta::new(&key).with_label(USER_ID_LABEL, format!("user-{i}")),
                    spec: AccountRecordSpec::default(),
                };
                store.create(record.into_object()).await
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.expect("task should not panic"));
    }

    let created = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(Error::AlreadyExists { .. })))
        .count();
    assert_eq!(created, 1);
    assert_eq!(rejected, 15);
    assert_eq!(store.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_status_updates_from_same_version() {
    let store = InMemoryObjectStore::new_arc();
    let key = ObjectKey::new("host", "john");
    let base = store
        .create_resource(SignupRequest::new(&key, "john"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            let mut signup = base.clone();
            tokio::spawn(async move {
                signup.status.compliant_username = Some(format!("name-{i}"));
                store.update_resource_status(signup).await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.expect("task should not panic") {
            Ok(_) => succeeded += 1,
            Err(e) => assert!(matches!(e, Error::Conflict { .. }), "unexpected error: {e}"),
        }
    }

    assert_eq!(succeeded, 1);
    let stored: SignupRequest = store.get_resource(&key).await.unwrap().unwrap();
    assert_eq!(stored.meta.resource_version, 2);
}
