//! Status conditions and the merge primitive every status write goes through.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The named conditions a signup request reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// Whether the signup has been approved, and how.
    Approved,
    /// Whether the signup has been fully provisioned.
    Complete,
}

/// Fixed vocabulary of condition reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    ApprovedByAdmin,
    ApprovedAutomatically,
    PendingApproval,
    FailedToReadApprovalPolicy,
    InvalidAccountRecordState,
    UnableToCreateAccountRecord,
    NoClustersAvailable,
    NoTemplateTierAvailable,
}

impl Reason {
    /// The persisted spelling of the reason.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApprovedByAdmin => "ApprovedByAdmin",
            Self::ApprovedAutomatically => "ApprovedAutomatically",
            Self::PendingApproval => "PendingApproval",
            Self::FailedToReadApprovalPolicy => "FailedToReadApprovalPolicy",
            Self::InvalidAccountRecordState => "InvalidAccountRecordState",
            Self::UnableToCreateAccountRecord => "UnableToCreateAccountRecord",
            Self::NoClustersAvailable => "NoClustersAvailable",
            Self::NoTemplateTierAvailable => "NoTemplateTierAvailable",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observation about a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    /// Create a condition with no transition time yet.
    pub fn new(
        condition_type: ConditionType,
        status: bool,
        reason: Option<Reason>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type,
            status,
            reason,
            message: message.into(),
            last_transition_time: None,
        }
    }

    /// Whether two conditions describe the same state, ignoring timestamps.
    pub fn same_state(&self, other: &Self) -> bool {
        self.condition_type == other.condition_type
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Find a condition by type.
pub fn find_condition(conditions: &[Condition], condition_type: ConditionType) -> Option<&Condition> {
    conditions
        .iter()
        .find(|c| c.condition_type == condition_type)
}

/// Merge `new` into `conditions` by type.
///
/// Returns `false` and leaves the list untouched when a condition of the same
/// type already carries identical status, reason and message. Otherwise the
/// existing entry is replaced in place (or `new` is appended) and `true` is
/// returned. The transition time moves to `now` only when the condition is new
/// or its boolean status flips.
pub fn merge_condition(conditions: &mut Vec<Condition>, new: Condition, now: DateTime<Utc>) -> bool {
    match conditions
        .iter_mut()
        .find(|c| c.condition_type == new.condition_type)
    {
        Some(existing) if existing.same_state(&new) => false,
        Some(existing) => {
            let transition_time = if existing.status == new.status {
                existing.last_transition_time.or(Some(now))
            } else {
                Some(now)
            };
            *existing = Condition {
                last_transition_time: transition_time,
                ..new
            };
            true
        }
        None => {
            conditions.push(Condition {
                last_transition_time: Some(now),
                ..new
            });
            true
        }
    }
}

/// Merge several conditions; returns whether any of them changed the list.
pub fn merge_conditions(
    conditions: &mut Vec<Condition>,
    new: impl IntoIterator<Item = Condition>,
    now: DateTime<Utc>,
) -> bool {
    new.into_iter()
        .fold(false, |changed, c| merge_condition(conditions, c, now) || changed)
}
