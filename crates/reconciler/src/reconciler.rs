//! Reconciler implementation.

use std::sync::Arc;

use chrono::Utc;
use signup_core::{
    AccountRecord, AccountRecordSpec, EmbeddedUserAccount, Kind, LabelSelector, NamespaceDescriptor,
    NamespaceTemplateSet, ObjectKey, ObjectMeta, SignupRequest, TemplateTier, UserAccountSpec,
    USER_ID_LABEL,
};
use signup_store::{ObjectStore, ResourceStoreExt};
use tracing::{debug, error, info};

use crate::approval::ApprovalPolicyReader;
use crate::cluster::ClusterSelector;
use crate::config::ReconcilerConfig;
use crate::error::{Error, Result};
use crate::status::StatusUpdate;
use crate::types::ReconcileResult;
use crate::username::UsernameAllocator;

/// K8s-style reconciler turning signup requests into account records.
///
/// Holds no state shared between identities; every call reads the store
/// afresh, so concurrent reconciliation of different identities is safe.
pub struct SignupReconciler {
    /// Backing object store.
    store: Arc<dyn ObjectStore>,
    /// Member cluster source.
    clusters: Arc<dyn ClusterSelector>,
    approval: ApprovalPolicyReader,
    allocator: UsernameAllocator,
    /// Configuration.
    config: ReconcilerConfig,
}

impl SignupReconciler {
    /// Create a new reconciler.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clusters: Arc<dyn ClusterSelector>,
        config: ReconcilerConfig,
    ) -> Self {
        let approval = ApprovalPolicyReader::new(
            Arc::clone(&store),
            config.approval_config_name.clone(),
            config.approval_policy_key.clone(),
        );
        let allocator = UsernameAllocator::new(Arc::clone(&store), config.max_username_attempts);

        Self {
            store,
            clusters,
            approval,
            allocator,
            config,
        }
    }

    /// Drive the signup request at `key` one step towards its account record.
    ///
    /// Safe to call again after any failure: each branch re-reads the store
    /// and status writes are skipped when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error when the signup cannot make progress. The signup's
    /// status is updated first on every path where it was read.
    /// [`Error::requeue_requested`] tells a transient failure apart.
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileResult> {
        info!(namespace = %key.namespace, name = %key.name, "Reconciling signup request");

        let Some(mut signup) = self.store.get_resource::<SignupRequest>(key).await? else {
            debug!(%key, "Signup request not found, assuming deleted");
            return Ok(ReconcileResult::done());
        };

        let selector = LabelSelector::new().with(USER_ID_LABEL, signup.meta.name.clone());
        let records = match self
            .store
            .list_resources::<AccountRecord>(&key.namespace, &selector)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                return Err(self
                    .fail_with_status(
                        &mut signup,
                        StatusUpdate::InvalidAccountRecordState,
                        e.into(),
                        "failed to list account records",
                    )
                    .await);
            }
        };

        match records.as_slice() {
            [] => {}
            [record] => {
                info!(account = %record.meta.name, "Account record exists, setting status to complete");
                let update = StatusUpdate::Complete {
                    compliant_username: record.meta.name.clone(),
                };
                self.set_status(&mut signup, update, "").await?;
                return Ok(ReconcileResult::done());
            }
            _ => {
                let err = Error::multiple_account_records(key.clone(), records.len());
                return Err(self
                    .fail_with_status(
                        &mut signup,
                        StatusUpdate::InvalidAccountRecordState,
                        err,
                        "multiple account records found",
                    )
                    .await);
            }
        }

        let policy = match self.approval.read(&key.namespace).await {
            Ok(policy) => policy,
            Err(e) => {
                return Err(self
                    .fail_with_status(
                        &mut signup,
                        StatusUpdate::FailedToReadApprovalPolicy,
                        e.into(),
                        "",
                    )
                    .await);
            }
        };

        let approval = if signup.spec.approved {
            StatusUpdate::ApprovedByAdmin
        } else if policy.is_automatic() {
            StatusUpdate::ApprovedAutomatically
        } else {
            info!(policy = %policy, "Signup request pending approval");
            self.set_status(&mut signup, StatusUpdate::PendingApproval, "")
                .await?;
            return Ok(ReconcileResult::done());
        };
        self.set_status(&mut signup, approval, "").await?;

        let Some(target_cluster) = self.resolve_target_cluster(&signup).await else {
            error!(signup = %key, "No member clusters found");
            return Err(self
                .fail_with_status(
                    &mut signup,
                    StatusUpdate::NoClustersAvailable,
                    Error::NoClustersAvailable,
                    "",
                )
                .await);
        };

        let tier_key = ObjectKey::new(key.namespace.clone(), self.config.template_tier_name.clone());
        let tier = match self.store.get_resource::<TemplateTier>(&tier_key).await {
            Ok(Some(tier)) => tier,
            Ok(None) => {
                debug!(tier = %tier_key, "Template tier not available yet");
                return Err(self
                    .fail_with_status(
                        &mut signup,
                        StatusUpdate::NoTemplateTierAvailable,
                        Error::template_tier_not_found(tier_key),
                        "",
                    )
                    .await);
            }
            // Only a missing tier asks for a requeue; a failing store is left
            // to the scheduler's backoff like every other store error.
            Err(e) => {
                return Err(self
                    .fail_with_status(
                        &mut signup,
                        StatusUpdate::NoTemplateTierAvailable,
                        e.into(),
                        "failed to read template tier",
                    )
                    .await);
            }
        };

        self.provision_account_record(&mut signup, &target_cluster, &tier)
            .await?;

        Ok(ReconcileResult::done())
    }

    /// Explicit target on the request wins; otherwise the first member cluster.
    async fn resolve_target_cluster(&self, signup: &SignupRequest) -> Option<String> {
        match signup.spec.target_cluster.as_deref() {
            Some(cluster) if !cluster.is_empty() => Some(cluster.to_string()),
            _ => self.clusters.select().await.map(|c| c.name),
        }
    }

    /// Create the account record for an approved signup.
    ///
    /// Leaves the Complete condition alone: the next pass finds the record and
    /// marks the signup complete.
    async fn provision_account_record(
        &self,
        signup: &mut SignupRequest,
        target_cluster: &str,
        tier: &TemplateTier,
    ) -> Result<()> {
        let namespaces = tier
            .spec
            .namespaces
            .iter()
            .map(|ns| NamespaceDescriptor {
                namespace_type: ns.namespace_type.clone(),
                revision: ns.revision.clone(),
            })
            .collect();

        let user_accounts = vec![EmbeddedUserAccount {
            target_cluster: target_cluster.to_string(),
            spec: UserAccountSpec {
                user_id: signup.meta.name.clone(),
                ns_limit: self.config.ns_limit.clone(),
                ns_template_set: NamespaceTemplateSet {
                    tier_name: tier.meta.name.clone(),
                    namespaces,
                },
            },
        }];

        let compliant_name = match self
            .allocator
            .allocate(&signup.spec.username, &signup.meta.namespace, &signup.meta.name)
            .await
        {
            Ok(name) => name,
            Err(e) => {
                let context = format!(
                    "error generating compliant username for {}",
                    signup.spec.username
                );
                return Err(self
                    .fail_with_status(
                        signup,
                        StatusUpdate::UnableToCreateAccountRecord,
                        e.into(),
                        &context,
                    )
                    .await);
            }
        };

        let record = AccountRecord {
            meta: ObjectMeta::new(&ObjectKey::new(
                signup.meta.namespace.clone(),
                compliant_name.clone(),
            ))
            .with_label(USER_ID_LABEL, signup.meta.name.clone())
            .with_owner(Kind::SignupRequest, signup.meta.name.clone()),
            spec: AccountRecordSpec { user_accounts },
        };

        if let Err(e) = self.store.create_resource(record).await {
            return Err(self
                .fail_with_status(
                    signup,
                    StatusUpdate::UnableToCreateAccountRecord,
                    e.into(),
                    "error creating account record",
                )
                .await);
        }

        info!(name = %compliant_name, target_cluster, "Created account record");
        Ok(())
    }

    /// Apply `update` and persist the status if anything changed.
    ///
    /// On success `signup` is replaced by the stored copy, so later writes in
    /// the same pass carry the current version.
    async fn set_status(
        &self,
        signup: &mut SignupRequest,
        update: StatusUpdate,
        message: &str,
    ) -> Result<()> {
        let mut updated = signup.clone();
        if !update.apply(&mut updated.status, message, Utc::now()) {
            return Ok(());
        }

        *signup = self.store.update_resource_status(updated).await?;
        Ok(())
    }

    /// Record a failure on the signup and return `err` wrapped in `context`.
    ///
    /// A failing status write is logged and never replaces `err`.
    async fn fail_with_status(
        &self,
        signup: &mut SignupRequest,
        update: StatusUpdate,
        err: Error,
        context: &str,
    ) -> Error {
        if let Err(status_err) = self.set_status(signup, update, &err.to_string()).await {
            error!(
                signup = %signup.key(),
                error = %status_err,
                cause = %err,
                "Error updating signup request status"
            );
        }
        err.with_context(context)
    }

    /// Get the configuration.
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

/// Builder for SignupReconciler.
pub struct ReconcilerBuilder {
    store: Option<Arc<dyn ObjectStore>>,
    clusters: Option<Arc<dyn ClusterSelector>>,
    config: ReconcilerConfig,
}

impl ReconcilerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            store: None,
            clusters: None,
            config: ReconcilerConfig::default(),
        }
    }

    /// Set the object store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the member cluster source.
    #[must_use]
    pub fn with_clusters(mut self, clusters: Arc<dyn ClusterSelector>) -> Self {
        self.clusters = Some(clusters);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the store or cluster source is missing or
    /// the configuration does not validate.
    pub fn build(self) -> Result<SignupReconciler> {
        let store = self
            .store
            .ok_or_else(|| Error::invalid_config("Object store is required"))?;

        let clusters = self
            .clusters
            .ok_or_else(|| Error::invalid_config("Cluster selector is required"))?;

        self.config.validate()?;

        Ok(SignupReconciler::new(store, clusters, self.config))
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use signup_store::InMemoryObjectStore;

    use super::*;
    use crate::cluster::StaticClusterSelector;

    fn setup_reconciler(clusters: &[&str]) -> (SignupReconciler, Arc<InMemoryObjectStore>) {
        let store = InMemoryObjectStore::new_arc();
        let reconciler = SignupReconciler::new(
            store.clone(),
            Arc::new(StaticClusterSelector::new(clusters.iter().copied())),
            ReconcilerConfig::default(),
        );
        (reconciler, store)
    }

    #[tokio::test]
    async fn test_reconcile_missing_signup_is_noop() {
        let (reconciler, store) = setup_reconciler(&["member"]);

        let result = reconciler.reconcile(&ObjectKey::new("host", "ghost")).await;

        assert!(matches!(result, Ok(ReconcileResult { requeue: false })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_resolve_target_cluster_prefers_explicit() {
        let (reconciler, _) = setup_reconciler(&["member-a", "member-b"]);
        let key = ObjectKey::new("host", "john");

        let pinned = SignupRequest::new(&key, "john").with_target_cluster("member-b");
        assert_eq!(
            reconciler.resolve_target_cluster(&pinned).await.as_deref(),
            Some("member-b")
        );

        let unpinned = SignupRequest::new(&key, "john");
        assert_eq!(
            reconciler.resolve_target_cluster(&unpinned).await.as_deref(),
            Some("member-a")
        );
    }

    #[tokio::test]
    async fn test_resolve_target_cluster_empty_membership() {
        let (reconciler, _) = setup_reconciler(&[]);
        let signup = SignupRequest::new(&ObjectKey::new("host", "john"), "john");
        assert!(reconciler.resolve_target_cluster(&signup).await.is_none());
    }

    #[test]
    fn test_builder() {
        let result = ReconcilerBuilder::new()
            .with_store(InMemoryObjectStore::new_arc())
            .with_clusters(Arc::new(StaticClusterSelector::new(["member"])))
            .with_config(ReconcilerConfig::default().template_tier("advanced"))
            .build();

        assert!(result.is_ok());
        let reconciler = result.ok();
        assert_eq!(
            reconciler.map(|r| r.config().template_tier_name.clone()),
            Some("advanced".to_string())
        );
    }

    #[test]
    fn test_builder_requires_store_and_clusters() {
        let missing_store = ReconcilerBuilder::new()
            .with_clusters(Arc::new(StaticClusterSelector::default()))
            .build();
        assert!(matches!(missing_store, Err(Error::InvalidConfig { .. })));

        let missing_clusters = ReconcilerBuilder::new()
            .with_store(InMemoryObjectStore::new_arc())
            .build();
        assert!(matches!(missing_clusters, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_validates_config() {
        let result = ReconcilerBuilder::new()
            .with_store(InMemoryObjectStore::new_arc())
            .with_clusters(Arc::new(StaticClusterSelector::default()))
            .with_config(ReconcilerConfig::default().max_username_attempts(0))
            .build();
        assert!(result.is_err());
    }
}
