//! Object metadata shared by every resource kind.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The kinds of resource the object store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// A user's request to join the platform.
    SignupRequest,
    /// The provisioned account derived from an approved signup.
    AccountRecord,
    /// A named bundle of namespace templates.
    TemplateTier,
    /// Namespaced key/value configuration.
    ConfigRecord,
}

impl Kind {
    /// The canonical name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignupRequest => "SignupRequest",
            Self::AccountRecord => "AccountRecord",
            Self::TemplateTier => "TemplateTier",
            Self::ConfigRecord => "ConfigRecord",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SignupRequest" => Ok(Self::SignupRequest),
            "AccountRecord" => Ok(Self::AccountRecord),
            "TemplateTier" => Ok(Self::TemplateTier),
            "ConfigRecord" => Ok(Self::ConfigRecord),
            other => Err(Error::unknown_kind(other)),
        }
    }
}

/// Namespace plus name: the identity of an object within its kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    /// Create a new key.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ObjectKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = s
            .split_once('/')
            .ok_or_else(|| Error::invalid_identity(s, "expected 'namespace/name'"))?;

        if namespace.is_empty() || name.is_empty() {
            return Err(Error::invalid_identity(
                s,
                "namespace and name must both be non-empty",
            ));
        }
        if name.contains('/') {
            return Err(Error::invalid_identity(s, "name must not contain '/'"));
        }

        Ok(Self::new(namespace, name))
    }
}

/// Back-reference from a derived object to the object it was created for.
///
/// This is a plain foreign key. Nothing here cascades deletes; orphan cleanup
/// belongs to whoever owns the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
    pub kind: Kind,
    pub name: String,
}

/// Metadata carried by every object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Assigned by the store on every write; zero for objects never stored.
    #[serde(default)]
    pub resource_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerReference>,
}

impl ObjectMeta {
    /// Metadata for a new object at `key`.
    pub fn new(key: &ObjectKey) -> Self {
        Self {
            name: key.name.clone(),
            namespace: key.namespace.clone(),
            ..Self::default()
        }
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Set the owner back-reference.
    #[must_use]
    pub fn with_owner(mut self, kind: Kind, name: impl Into<String>) -> Self {
        self.owner = Some(OwnerReference {
            kind,
            name: name.into(),
        });
        self
    }

    /// The identity key of this object.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace.clone(), self.name.clone())
    }

    /// Look up a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Equality-based label selector. An empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector(BTreeMap<String, String>);

impl LabelSelector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to equal `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Whether `labels` satisfies every requirement.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.0
            .iter()
            .all(|(key, value)| labels.get(key).is_some_and(|v| v == value))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = itertools::join(self.0.iter().map(|(k, v)| format!("{k}={v}")), ",");
        f.write_str(&rendered)
    }
}
