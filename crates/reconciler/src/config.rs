//! Configuration for the signup reconciler.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the SignupReconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Template tier every new account is provisioned from.
    #[serde(default = "default_template_tier_name")]
    pub template_tier_name: String,

    /// Config record holding the approval policy.
    #[serde(default = "default_approval_config_name")]
    pub approval_config_name: String,

    /// Key of the approval policy within the config record.
    #[serde(default = "default_approval_policy_key")]
    pub approval_policy_key: String,

    /// Namespace limit tag stamped on every account.
    #[serde(default = "default_ns_limit")]
    pub ns_limit: String,

    /// Numeric suffixes tried before name allocation gives up.
    #[serde(default = "default_max_username_attempts")]
    pub max_username_attempts: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            template_tier_name: default_template_tier_name(),
            approval_config_name: default_approval_config_name(),
            approval_policy_key: default_approval_policy_key(),
            ns_limit: default_ns_limit(),
            max_username_attempts: default_max_username_attempts(),
        }
    }
}

impl ReconcilerConfig {
    /// Set the template tier name.
    #[must_use]
    pub fn template_tier(mut self, name: impl Into<String>) -> Self {
        self.template_tier_name = name.into();
        self
    }

    /// Set the name allocation bound.
    #[must_use]
    pub const fn max_username_attempts(mut self, attempts: u32) -> Self {
        self.max_username_attempts = attempts;
        self
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `SIGNUP_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `SIGNUP_*` overrides resolved through `lookup`.
    ///
    /// Unparseable numbers are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(tier) = lookup("SIGNUP_TEMPLATE_TIER") {
            self.template_tier_name = tier;
        }

        if let Some(name) = lookup("SIGNUP_APPROVAL_CONFIG_NAME") {
            self.approval_config_name = name;
        }

        if let Some(key) = lookup("SIGNUP_APPROVAL_POLICY_KEY") {
            self.approval_policy_key = key;
        }

        if let Some(limit) = lookup("SIGNUP_NS_LIMIT") {
            self.ns_limit = limit;
        }

        if let Some(attempts) = lookup("SIGNUP_MAX_USERNAME_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.max_username_attempts = attempts;
        }

        self
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        load_file(path)
    }

    /// Check that every name is set and the attempt bound is positive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("template_tier_name", &self.template_tier_name),
            ("approval_config_name", &self.approval_config_name),
            ("approval_policy_key", &self.approval_policy_key),
            ("ns_limit", &self.ns_limit),
        ];

        if let Some((field, _)) = names.iter().find(|(_, value)| value.is_empty()) {
            return Err(Error::invalid_config(format!("{field} must not be empty")));
        }

        if self.max_username_attempts == 0 {
            return Err(Error::invalid_config(
                "max_username_attempts must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Deserialize a configuration file: JSON by extension, TOML otherwise.
///
/// Shared by every config type that embeds [`ReconcilerConfig`].
///
/// # Errors
///
/// Returns `InvalidConfig` if the file cannot be read or parsed.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::invalid_config(format!("Failed to read {}: {e}", path.display()))
    })?;

    if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse config: {e}")))
    } else {
        toml::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse config: {e}")))
    }
}

fn default_template_tier_name() -> String {
    "basic".to_string()
}

fn default_approval_config_name() -> String {
    "toolchain-config".to_string()
}

fn default_approval_policy_key() -> String {
    "user-approval-policy".to_string()
}

fn default_ns_limit() -> String {
    "default".to_string()
}

const fn default_max_username_attempts() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.template_tier_name, "basic");
        assert_eq!(config.max_username_attempts, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SIGNUP_TEMPLATE_TIER", "advanced"),
            ("SIGNUP_MAX_USERNAME_ATTEMPTS", "5"),
            ("SIGNUP_NS_LIMIT", "team"),
        ]
        .into_iter()
        .collect();

        let config = ReconcilerConfig::default()
            .with_overrides(|name| env.get(name).map(ToString::to_string));

        assert_eq!(config.template_tier_name, "advanced");
        assert_eq!(config.max_username_attempts, 5);
        assert_eq!(config.ns_limit, "team");
        assert_eq!(config.approval_policy_key, "user-approval-policy");
    }

    #[test]
    fn test_unparseable_attempts_ignored() {
        let config = ReconcilerConfig::default().with_overrides(|name| {
            (name == "SIGNUP_MAX_USERNAME_ATTEMPTS").then(|| "many".to_string())
        });
        assert_eq!(config.max_username_attempts, 100);
    }

    #[test]
    fn test_from_toml_file_fills_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "template_tier_name = \"advanced\"").unwrap();

        let config = ReconcilerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.template_tier_name, "advanced");
        assert_eq!(config.approval_config_name, "toolchain-config");
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"max_username_attempts": 3}}"#).unwrap();

        let config = ReconcilerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_username_attempts, 3);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_username_attempts = \"lots\"").unwrap();

        let result = ReconcilerConfig::from_file(file.path());
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty_tier = ReconcilerConfig::default().template_tier("");
        assert!(empty_tier.validate().is_err());

        let zero = ReconcilerConfig::default().max_username_attempts(0);
        assert!(zero.validate().is_err());
    }
}
