//! Loading and printing object snapshots.

use std::path::Path;

use anyhow::{Context, Result};
use signup_core::{Kind, Object, ObjectKey};

use crate::cli::OutputFormat;

/// Load a list of objects: JSON by extension, YAML otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<Object>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    parse(&content, path.extension().is_some_and(|e| e == "json"))
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

fn parse(content: &str, json: bool) -> Result<Vec<Object>> {
    if json {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Render objects in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(objects: &[Object], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(objects).context("Failed to render YAML"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(objects).context("Failed to render JSON")
        }
    }
}

/// Keys of every signup request in `objects`, in snapshot order.
pub fn signup_keys(objects: &[Object]) -> Vec<ObjectKey> {
    objects
        .iter()
        .filter(|o| o.kind() == Kind::SignupRequest)
        .map(Object::key)
        .collect()
}
