//! Serialization of API documents to YAML or JSON.

use crate::document::ApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an API document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(document: &ApiDocument) -> Result<String> {
    debug!("serializing API document to YAML");
    serde_yaml::to_string(document).context("Failed to serialize API document to YAML")
}

/// Serializes an API document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(document: &ApiDocument) -> Result<String> {
    debug!("serializing API document to JSON");
    serde_json::to_string_pretty(document).context("Failed to serialize API document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
