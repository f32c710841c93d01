//! Resource model for signup provisioning.
//!
//! - **Identity**: `ObjectKey` (`namespace/name`) and `ObjectMeta`
//! - **Resources**: `SignupRequest`, `AccountRecord`, `TemplateTier`, `ConfigRecord`
//! - **Object**: the tagged union the object store works with
//! - **Conditions**: status observations and the merge primitive every status
//!   write goes through

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod condition;
pub mod error;
pub mod meta;
pub mod resources;

// Re-export main types
pub use condition::{find_condition, merge_condition, merge_conditions, Condition, ConditionType, Reason};
pub use error::{Error, Result};
pub use meta::{Kind, LabelSelector, ObjectKey, ObjectMeta, OwnerReference};
pub use resources::{
    AccountRecord, AccountRecordSpec, ConfigRecord, CredentialBrokerConfig, EmbeddedUserAccount,
    NamespaceDescriptor, NamespaceTemplateSet, Object, Resource, SignupRequest, SignupRequestSpec,
    SignupRequestStatus, TemplateTier, TemplateTierSpec, TierNamespace, UserAccountSpec,
    USER_ID_LABEL,
};
