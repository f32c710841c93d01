//! User approval policy lookup.

use std::fmt;
use std::sync::Arc;

use signup_core::{ConfigRecord, ObjectKey};
use signup_store::{ObjectStore, ResourceStoreExt};
use tracing::debug;

/// Policy value that approves signups without an administrator.
pub const POLICY_AUTOMATIC: &str = "automatic";

/// Policy value that waits for an administrator.
pub const POLICY_MANUAL: &str = "manual";

/// How signups in a namespace get approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalPolicy {
    /// Every signup proceeds.
    Automatic,
    /// Signups wait for an administrator.
    Manual,
    /// Any other configured value, including the empty value reported when
    /// the config record lacks the policy key. Never approves.
    Unrecognized(String),
}

impl ApprovalPolicy {
    /// Parse a configured value. Matching is exact.
    pub fn parse(value: &str) -> Self {
        match value {
            POLICY_AUTOMATIC => Self::Automatic,
            POLICY_MANUAL => Self::Manual,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Whether signups proceed without an administrator.
    pub const fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }

    /// The configured spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Automatic => POLICY_AUTOMATIC,
            Self::Manual => POLICY_MANUAL,
            Self::Unrecognized(value) => value,
        }
    }
}

impl fmt::Display for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the approval policy from a namespaced config record.
#[derive(Clone)]
pub struct ApprovalPolicyReader {
    store: Arc<dyn ObjectStore>,
    config_name: String,
    policy_key: String,
}

impl ApprovalPolicyReader {
    /// Create a reader looking up `policy_key` in the config record named
    /// `config_name`.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        config_name: impl Into<String>,
        policy_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            config_name: config_name.into(),
            policy_key: policy_key.into(),
        }
    }

    /// Read the policy for `namespace`.
    ///
    /// A missing config record means [`ApprovalPolicy::Manual`]. A record
    /// without the policy key yields `Unrecognized("")`.
    ///
    /// # Errors
    ///
    /// Returns any store failure other than the record being absent.
    pub async fn read(&self, namespace: &str) -> signup_store::Result<ApprovalPolicy> {
        let key = ObjectKey::new(namespace, self.config_name.clone());
        let Some(config) = self.store.get_resource::<ConfigRecord>(&key).await? else {
            debug!(%key, "No approval config found, defaulting to manual");
            return Ok(ApprovalPolicy::Manual);
        };

        Ok(config
            .data
            .get(&self.policy_key)
            .map_or_else(|| ApprovalPolicy::Unrecognized(String::new()), |v| ApprovalPolicy::parse(v)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use signup_core::Resource;
    use signup_store::InMemoryObjectStore;

    use super::*;

    const CONFIG: &str = "toolchain-config";
    const KEY: &str = "user-approval-policy";

    #[test]
    fn test_parse_policy() {
        assert_eq!(ApprovalPolicy::parse("automatic"), ApprovalPolicy::Automatic);
        assert_eq!(ApprovalPolicy::parse("manual"), ApprovalPolicy::Manual);
        assert_eq!(
            ApprovalPolicy::parse("Automatic"),
            ApprovalPolicy::Unrecognized("Automatic".to_string())
        );
        assert!(!ApprovalPolicy::parse("").is_automatic());
    }

    #[tokio::test]
    async fn test_missing_config_defaults_to_manual() {
        let reader = ApprovalPolicyReader::new(InMemoryObjectStore::new_arc(), CONFIG, KEY);
        assert_eq!(reader.read("host").await.unwrap(), ApprovalPolicy::Manual);
    }

    #[tokio::test]
    async fn test_missing_key_is_empty_not_manual() {
        let store = InMemoryObjectStore::new_arc();
        store
            .seed([ConfigRecord::new(&ObjectKey::new("host", CONFIG))
                .with_entry("unrelated", "x")
                .into_object()])
            .await;
        let reader = ApprovalPolicyReader::new(store, CONFIG, KEY);

        let policy = reader.read("host").await.unwrap();
        assert_eq!(policy, ApprovalPolicy::Unrecognized(String::new()));
        assert!(!policy.is_automatic());
    }

    #[tokio::test]
    async fn test_reads_configured_policy_per_namespace() {
        let store = InMemoryObjectStore::new_arc();
        store
            .seed([ConfigRecord::new(&ObjectKey::new("host", CONFIG))
                .with_entry(KEY, "automatic")
                .into_object()])
            .await;
        let reader = ApprovalPolicyReader::new(store, CONFIG, KEY);

        assert!(reader.read("host").await.unwrap().is_automatic());
        assert_eq!(reader.read("other").await.unwrap(), ApprovalPolicy::Manual);
    }
}
