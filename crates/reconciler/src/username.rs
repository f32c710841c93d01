//! Compliant account name allocation.
//!
//! A raw username such as `john@example.com` becomes `john-at-example-com`.
//! When that name is taken by another signup's account record, numeric
//! suffixes are tried in order (`-1`, `-2`, ...) up to a fixed bound. The
//! outcome depends only on the raw username and what the store reports.

use std::sync::Arc;

use signup_core::{AccountRecord, ObjectKey};
use signup_store::{ObjectStore, ResourceStoreExt};
use thiserror::Error;
use tracing::debug;

/// Longest name the store accepts.
pub const MAX_NAME_LENGTH: usize = 63;

/// Errors raised while allocating a compliant name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// A candidate derived from the username is not a legal object name.
    #[error("transformed username [{candidate}] is invalid")]
    InvalidName { candidate: String },

    /// A record with this name already belongs to the same signup.
    #[error("could not generate compliant username as account record [{name}] already exists")]
    AlreadyExists { name: String },

    /// Every candidate up to the bound is taken.
    #[error("unable to transform username [{username}] even after {attempts} attempts")]
    Exhausted { username: String, attempts: u32 },

    /// The store failed while probing.
    #[error(transparent)]
    Store(#[from] signup_store::Error),
}

/// Replace `@` with `-at-` and `.` with `-`.
pub fn transform_username(username: &str) -> String {
    username.replace('@', "-at-").replace('.', "-")
}

/// Whether `name` is a legal object name: lowercase alphanumerics and `-`,
/// at most [`MAX_NAME_LENGTH`] characters, starting and ending alphanumeric.
pub fn is_valid_name(name: &str) -> bool {
    let is_alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    !name.is_empty()
        && name.len() <= MAX_NAME_LENGTH
        && name.chars().all(|c| is_alnum(c) || c == '-')
        && name.starts_with(is_alnum)
        && name.ends_with(is_alnum)
}

/// The candidate sequence: `base`, then `base-1` through `base-{max_suffix}`.
pub fn candidates(base: &str, max_suffix: u32) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((1..=max_suffix).map(move |n| format!("{base}-{n}")))
}

/// Allocates unused account record names.
#[derive(Clone)]
pub struct UsernameAllocator {
    store: Arc<dyn ObjectStore>,
    max_attempts: u32,
}

impl UsernameAllocator {
    /// Create an allocator probing `store`, trying at most `max_attempts`
    /// numeric suffixes.
    pub fn new(store: Arc<dyn ObjectStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts,
        }
    }

    /// Allocate a compliant name for `username` in `namespace`.
    ///
    /// `user_id` is the identity label value of the requesting signup; a
    /// record already carrying it means provisioning raced with another pass
    /// and is reported as [`AllocationError::AlreadyExists`].
    ///
    /// # Errors
    ///
    /// Returns an error if a candidate name is invalid, if a record for the
    /// same signup already exists, if every candidate is taken, or if the store
    /// fails.
    pub async fn allocate(
        &self,
        username: &str,
        namespace: &str,
        user_id: &str,
    ) -> Result<String, AllocationError> {
        let transformed = transform_username(username);

        for candidate in candidates(&transformed, self.max_attempts) {
            // Suffixes can push a legal base past the length limit.
            if !is_valid_name(&candidate) {
                return Err(AllocationError::InvalidName { candidate });
            }

            let key = ObjectKey::new(namespace, candidate.clone());
            match self.store.get_resource::<AccountRecord>(&key).await? {
                None => return Ok(candidate),
                Some(existing) if existing.user_id() == Some(user_id) => {
                    return Err(AllocationError::AlreadyExists { name: candidate });
                }
                Some(existing) => {
                    debug!(
                        candidate = %candidate,
                        taken_by = existing.user_id().unwrap_or_default(),
                        "Compliant name taken, trying next suffix"
                    );
                }
            }
        }

        Err(AllocationError::Exhausted {
            username: username.to_string(),
            attempts: self.max_attempts,
        })
    }
}
