//! Typed resources and the tagged object union the store works with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::{find_condition, Condition, ConditionType};
use crate::meta::{Kind, ObjectKey, ObjectMeta};

/// Label carrying the identity of the signup an account record was made for.
pub const USER_ID_LABEL: &str = "toolchain.dev.openshift.com/user-id";

/// A typed resource that can live in the object store.
pub trait Resource: Clone + Send + Sync + Sized + 'static {
    /// The kind this type is stored under.
    const KIND: Kind;

    /// Object metadata.
    fn meta(&self) -> &ObjectMeta;

    /// Mutable object metadata.
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    /// Wrap into the tagged union.
    fn into_object(self) -> Object;

    /// Unwrap from the tagged union; `None` when the kind differs.
    fn from_object(object: Object) -> Option<Self>;
}

// ============================================================================
// SignupRequest
// ============================================================================

/// Credential broker settings embedded in a signup request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBrokerConfig {
    #[serde(default)]
    pub library_url: String,
    #[serde(default)]
    pub public_keys_url: String,
    #[serde(default)]
    pub raw_config: String,
}

/// Desired state of a signup request. Never mutated by reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestSpec {
    /// Raw username the compliant account name is derived from.
    pub username: String,
    /// Explicit approval by an administrator.
    #[serde(default)]
    pub approved: bool,
    /// Cluster to provision on; picked automatically when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_broker: Option<CredentialBrokerConfig>,
}

/// Observed state of a signup request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Name of the account record provisioned for this signup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliant_username: Option<String>,
}

/// A user's request to join the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub meta: ObjectMeta,
    pub spec: SignupRequestSpec,
    #[serde(default)]
    pub status: SignupRequestStatus,
}

impl SignupRequest {
    /// Create a signup request at `key` for `username`.
    pub fn new(key: &ObjectKey, username: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::new(key),
            spec: SignupRequestSpec {
                username: username.into(),
                ..SignupRequestSpec::default()
            },
            status: SignupRequestStatus::default(),
        }
    }

    /// Mark as approved by an administrator.
    #[must_use]
    pub const fn approved(mut self) -> Self {
        self.spec.approved = true;
        self
    }

    /// Pin the target cluster.
    #[must_use]
    pub fn with_target_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.spec.target_cluster = Some(cluster.into());
        self
    }

    /// The identity key of this signup.
    pub fn key(&self) -> ObjectKey {
        self.meta.key()
    }

    /// Look up a status condition.
    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        find_condition(&self.status.conditions, condition_type)
    }
}

impl Resource for SignupRequest {
    const KIND: Kind = Kind::SignupRequest;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    fn into_object(self) -> Object {
        Object::SignupRequest(self)
    }

    fn from_object(object: Object) -> Option<Self> {
        match object {
            Object::SignupRequest(signup) => Some(signup),
            _ => None,
        }
    }
}

// ============================================================================
// AccountRecord
// ============================================================================

/// One namespace of a template set, pinned to a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDescriptor {
    #[serde(rename = "type")]
    pub namespace_type: String,
    pub revision: String,
}

/// Template tier selection for an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceTemplateSet {
    pub tier_name: String,
    #[serde(default)]
    pub namespaces: Vec<NamespaceDescriptor>,
}

/// Account spec for a single cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountSpec {
    pub user_id: String,
    pub ns_limit: String,
    pub ns_template_set: NamespaceTemplateSet,
}

/// Account spec bound to the cluster it lands on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedUserAccount {
    pub target_cluster: String,
    pub spec: UserAccountSpec,
}

/// Desired state of an account record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecordSpec {
    #[serde(default)]
    pub user_accounts: Vec<EmbeddedUserAccount>,
}

/// The provisioned account derived from an approved signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub meta: ObjectMeta,
    pub spec: AccountRecordSpec,
}

impl AccountRecord {
    /// The identity label value, if present.
    pub fn user_id(&self) -> Option<&str> {
        self.meta.label(USER_ID_LABEL)
    }

    /// Key of the signup request this record names as owner.
    ///
    /// Changes to an account record are routed back to this key.
    pub fn owner_key(&self) -> Option<ObjectKey> {
        self.meta
            .owner
            .as_ref()
            .filter(|owner| owner.kind == Kind::SignupRequest)
            .map(|owner| ObjectKey::new(self.meta.namespace.clone(), owner.name.clone()))
    }
}

impl Resource for AccountRecord {
    const KIND: Kind = Kind::AccountRecord;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    fn into_object(self) -> Object {
        Object::AccountRecord(self)
    }

    fn from_object(object: Object) -> Option<Self> {
        match object {
            Object::AccountRecord(record) => Some(record),
            _ => None,
        }
    }
}

// ============================================================================
// TemplateTier
// ============================================================================

/// A namespace template within a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierNamespace {
    #[serde(rename = "type")]
    pub namespace_type: String,
    pub revision: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
}

/// Namespace templates offered by a tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTierSpec {
    #[serde(default)]
    pub namespaces: Vec<TierNamespace>,
}

/// Externally maintained bundle of namespace templates. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTier {
    pub meta: ObjectMeta,
    pub spec: TemplateTierSpec,
}

impl TemplateTier {
    /// Create a tier at `key` with `(type, revision)` namespaces.
    pub fn new<'a>(key: &ObjectKey, namespaces: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            meta: ObjectMeta::new(key),
            spec: TemplateTierSpec {
                namespaces: namespaces
                    .into_iter()
                    .map(|(namespace_type, revision)| TierNamespace {
                        namespace_type: namespace_type.to_string(),
                        revision: revision.to_string(),
                        template: String::new(),
                    })
                    .collect(),
            },
        }
    }
}

impl Resource for TemplateTier {
    const KIND: Kind = Kind::TemplateTier;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    fn into_object(self) -> Object {
        Object::TemplateTier(self)
    }

    fn from_object(object: Object) -> Option<Self> {
        match object {
            Object::TemplateTier(tier) => Some(tier),
            _ => None,
        }
    }
}

// ============================================================================
// ConfigRecord
// ============================================================================

/// Namespaced string configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl ConfigRecord {
    /// Create an empty config record at `key`.
    pub fn new(key: &ObjectKey) -> Self {
        Self {
            meta: ObjectMeta::new(key),
            data: BTreeMap::new(),
        }
    }

    /// Add an entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

impl Resource for ConfigRecord {
    const KIND: Kind = Kind::ConfigRecord;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    fn into_object(self) -> Object {
        Object::ConfigRecord(self)
    }

    fn from_object(object: Object) -> Option<Self> {
        match object {
            Object::ConfigRecord(config) => Some(config),
            _ => None,
        }
    }
}

// ============================================================================
// Object
// ============================================================================

/// Any object the store holds, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Object {
    SignupRequest(SignupRequest),
    AccountRecord(AccountRecord),
    TemplateTier(TemplateTier),
    ConfigRecord(ConfigRecord),
}

impl Object {
    /// The kind of this object.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::SignupRequest(_) => Kind::SignupRequest,
            Self::AccountRecord(_) => Kind::AccountRecord,
            Self::TemplateTier(_) => Kind::TemplateTier,
            Self::ConfigRecord(_) => Kind::ConfigRecord,
        }
    }

    /// Object metadata.
    pub const fn meta(&self) -> &ObjectMeta {
        match self {
            Self::SignupRequest(o) => &o.meta,
            Self::AccountRecord(o) => &o.meta,
            Self::TemplateTier(o) => &o.meta,
            Self::ConfigRecord(o) => &o.meta,
        }
    }

    /// Mutable object metadata.
    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::SignupRequest(o) => &mut o.meta,
            Self::AccountRecord(o) => &mut o.meta,
            Self::TemplateTier(o) => &mut o.meta,
            Self::ConfigRecord(o) => &mut o.meta,
        }
    }

    /// The identity key of this object.
    pub fn key(&self) -> ObjectKey {
        self.meta().key()
    }
}
