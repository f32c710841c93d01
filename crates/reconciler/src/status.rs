//! Outcome-tagged status updates for signup requests.
//!
//! Each reconciliation outcome is one [`StatusUpdate`] variant; turning it
//! into conditions and merging them is one operation shared by all of them.

use chrono::{DateTime, Utc};
use signup_core::{merge_conditions, Condition, ConditionType, Reason, SignupRequestStatus};

/// A reconciliation outcome to record on a signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// An administrator approved the signup.
    ApprovedByAdmin,
    /// The namespace policy approved the signup.
    ApprovedAutomatically,
    /// Waiting for an administrator.
    PendingApproval,
    /// The account record exists under this name.
    Complete { compliant_username: String },
    /// The approval policy could not be read.
    FailedToReadApprovalPolicy,
    /// Account records for the signup are inconsistent.
    InvalidAccountRecordState,
    /// The account record could not be named or created.
    UnableToCreateAccountRecord,
    /// No member cluster to provision on.
    NoClustersAvailable,
    /// The template tier does not exist yet.
    NoTemplateTierAvailable,
}

impl StatusUpdate {
    /// The conditions this outcome sets.
    pub fn conditions(&self, message: &str) -> Vec<Condition> {
        let complete_false =
            |reason| Condition::new(ConditionType::Complete, false, Some(reason), message);

        match self {
            Self::ApprovedByAdmin => vec![Condition::new(
                ConditionType::Approved,
                true,
                Some(Reason::ApprovedByAdmin),
                message,
            )],
            Self::ApprovedAutomatically => vec![Condition::new(
                ConditionType::Approved,
                true,
                Some(Reason::ApprovedAutomatically),
                message,
            )],
            Self::PendingApproval => vec![
                Condition::new(
                    ConditionType::Approved,
                    false,
                    Some(Reason::PendingApproval),
                    message,
                ),
                complete_false(Reason::PendingApproval),
            ],
            Self::Complete { .. } => {
                vec![Condition::new(ConditionType::Complete, true, None, message)]
            }
            Self::FailedToReadApprovalPolicy => {
                vec![complete_false(Reason::FailedToReadApprovalPolicy)]
            }
            Self::InvalidAccountRecordState => {
                vec![complete_false(Reason::InvalidAccountRecordState)]
            }
            Self::UnableToCreateAccountRecord => {
                vec![complete_false(Reason::UnableToCreateAccountRecord)]
            }
            Self::NoClustersAvailable => vec![complete_false(Reason::NoClustersAvailable)],
            Self::NoTemplateTierAvailable => vec![complete_false(Reason::NoTemplateTierAvailable)],
        }
    }

    /// Apply this outcome to `status`. Returns whether anything changed.
    pub fn apply(&self, status: &mut SignupRequestStatus, message: &str, now: DateTime<Utc>) -> bool {
        let name_changed = match self {
            Self::Complete { compliant_username }
                if status.compliant_username.as_deref() != Some(compliant_username.as_str()) =>
            {
                status.compliant_username = Some(compliant_username.clone());
                true
            }
            _ => false,
        };

        merge_conditions(&mut status.conditions, self.conditions(message), now) || name_changed
    }
}
