use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use crate::error::Result;

/// Creates `path` (and its parent directory) holding `initial` when it does not exist yet.
/// Existing files are never overwritten, even when they fail to parse.
pub async fn ensure_json_file<T: Serialize>(path: &Path, initial: &T) -> Result<()> {
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }
    write_json(path, initial).await?;
    tracing::info!("Initialized {}", path.display());
    Ok(())
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes pretty JSON to a sibling temp file, then renames it over `path`.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let formatted = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, formatted).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
