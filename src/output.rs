//! Writing the snapshot file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::models::Snapshot;

/// Serialize `snapshot` as pretty-printed JSON and replace `path` with it.
///
/// The document is written to a temporary file next to `path` and renamed
/// into place, so readers never observe a partially written snapshot.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written or renamed.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    json.push('\n');

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .context("Failed to write snapshot")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!(path = %path.display(), bytes = json.len(), "Snapshot written");
    Ok(())
}
