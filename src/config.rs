//! Operator configuration: reconciler settings plus the member clusters.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use signup_reconciler::ReconcilerConfig;

/// Top-level operator configuration file.
///
/// Reconciler settings sit at the top level next to `member_clusters`:
///
/// ```toml
/// template_tier_name = "basic"
/// member_clusters = ["member-1", "member-2"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    #[serde(flatten)]
    pub reconciler: ReconcilerConfig,

    /// Member clusters, in selection order.
    #[serde(default)]
    pub member_clusters: Vec<String>,
}

impl OperatorConfig {
    /// Load from `path` when given, apply `SIGNUP_*` environment overrides,
    /// then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the result
    /// does not validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                Self {
                    reconciler: config.reconciler.with_env_overrides(),
                    ..config
                }
            }
            None => Self {
                reconciler: ReconcilerConfig::from_env(),
                member_clusters: Vec::new(),
            },
        };
        config.reconciler.validate()?;
        Ok(config)
    }

    /// Load configuration from a file: JSON by extension, TOML otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        signup_reconciler::config::load_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use super::*;

    #[test]
    fn test_toml_with_clusters_and_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "template_tier_name = \"advanced\"").unwrap();
        writeln!(file, "member_clusters = [\"member-1\", \"member-2\"]").unwrap();

        let config = OperatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.reconciler.template_tier_name, "advanced");
        assert_eq!(config.reconciler.approval_policy_key, "user-approval-policy");
        assert_eq!(config.member_clusters, ["member-1", "member-2"]);
    }

    #[test]
    fn test_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"member_clusters": ["east"], "ns_limit": "team"}}"#).unwrap();

        let config = OperatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.member_clusters, ["east"]);
        assert_eq!(config.reconciler.ns_limit, "team");
    }

    #[test]
    fn test_default_has_no_clusters() {
        let config = OperatorConfig::default();
        assert!(config.member_clusters.is_empty());
        assert_eq!(config.reconciler, ReconcilerConfig::default());
    }

    #[test]
    fn test_load_validates_file_contents() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_username_attempts = 0").unwrap();

        assert!(OperatorConfig::from_file(file.path()).is_ok());
        assert!(OperatorConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_invalid_file_reported() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "member_clusters = 7").unwrap();
        let err = OperatorConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }
}
