//! Shared fixtures for reconciler integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use signup_core::{
    AccountRecord, AccountRecordSpec, ConfigRecord, Kind, LabelSelector, Object, ObjectKey,
    ObjectMeta, Resource, SignupRequest, TemplateTier, USER_ID_LABEL,
};
use signup_reconciler::{ReconcilerConfig, SignupReconciler, StaticClusterSelector};
use signup_store::{Error, InMemoryObjectStore, ObjectStore, Result};

pub const NAMESPACE: &str = "toolchain-host";
pub const MEMBER: &str = "member-1";

/// In-memory store that counts writes and fails them on demand.
#[derive(Default)]
pub struct FaultyStore {
    inner: InMemoryObjectStore,
    fail_get: Mutex<Option<Kind>>,
    hide_from_list: AtomicBool,
    fail_create: AtomicBool,
    fail_update_status: AtomicBool,
    fail_list: AtomicBool,
    creates: AtomicUsize,
    status_updates: AtomicUsize,
}

impl FaultyStore {
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn seed(&self, objects: impl IntoIterator<Item = Object> + Send) {
        self.inner.seed(objects).await;
    }

    /// Fail every `get` of `kind`; `None` clears it.
    pub fn fail_get(&self, kind: Option<Kind>) {
        *self.fail_get.lock().unwrap() = kind;
    }

    /// Make `list_by_label` report nothing, as a stale cache would.
    pub fn hide_from_list(&self, hide: bool) {
        self.hide_from_list.store(hide, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_update_status(&self, fail: bool) {
        self.fail_update_status.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Successful creates so far.
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Successful status writes so far.
    pub fn status_updates(&self) -> usize {
        self.status_updates.load(Ordering::SeqCst)
    }

    pub async fn signup(&self, name: &str) -> SignupRequest {
        let object = self
            .inner
            .get(Kind::SignupRequest, &ObjectKey::new(NAMESPACE, name))
            .await
            .unwrap()
            .unwrap();
        SignupRequest::from_object(object).unwrap()
    }

    pub async fn account_records(&self) -> Vec<AccountRecord> {
        self.inner
            .snapshot()
            .await
            .into_iter()
            .filter_map(AccountRecord::from_object)
            .collect()
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    async fn get(&self, kind: Kind, key: &ObjectKey) -> Result<Option<Object>> {
        if *self.fail_get.lock().unwrap() == Some(kind) {
            return Err(Error::backend("get", "injected get failure"));
        }
        self.inner.get(kind, key).await
    }

    async fn list_by_label(
        &self,
        kind: Kind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::backend("list_by_label", "injected list failure"));
        }
        if self.hide_from_list.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        self.inner.list_by_label(kind, namespace, selector).await
    }

    async fn create(&self, object: Object) -> Result<Object> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::backend("create", "injected create failure"));
        }
        let created = self.inner.create(object).await?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(created)
    }

    async fn update_status(&self, object: Object) -> Result<Object> {
        if self.fail_update_status.load(Ordering::SeqCst) {
            return Err(Error::backend("update_status", "injected status failure"));
        }
        let updated = self.inner.update_status(object).await?;
        self.status_updates.fetch_add(1, Ordering::SeqCst);
        Ok(updated)
    }
}

pub fn key(name: &str) -> ObjectKey {
    ObjectKey::new(NAMESPACE, name)
}

pub fn signup(name: &str, username: &str) -> SignupRequest {
    SignupRequest::new(&key(name), username)
}

pub fn basic_tier() -> Object {
    TemplateTier::new(&key("basic"), [("dev", "abcde11"), ("code", "abcde21"), ("stage", "abcde31")])
        .into_object()
}

pub fn approval_policy(policy: &str) -> Object {
    ConfigRecord::new(&key("toolchain-config"))
        .with_entry("user-approval-policy", policy)
        .into_object()
}

/// An account record named `name` labelled for the signup `user_id`.
pub fn account_record(name: &str, user_id: &str) -> Object {
    AccountRecord {
        meta: ObjectMeta::new(&key(name))
            .with_label(USER_ID_LABEL, user_id)
            .with_owner(Kind::SignupRequest, user_id),
        spec: AccountRecordSpec::default(),
    }
    .into_object()
}

pub fn reconciler(store: Arc<FaultyStore>, clusters: &[&str]) -> SignupReconciler {
    SignupReconciler::new(
        store,
        Arc::new(StaticClusterSelector::new(clusters.iter().copied())),
        ReconcilerConfig::default(),
    )
}
