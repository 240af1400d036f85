use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

/// Reads a file, or `None` when it does not exist.
pub async fn read_optional(path: &str) -> Result<Option<String>> {
    if path.trim().is_empty() || !Path::new(path).exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    Ok(Some(content))
}
