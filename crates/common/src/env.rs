//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::debug;

/// Create the parent directory of a database file if it is missing.
///
/// In-memory databases (`:memory:`) and bare file names need nothing.
pub async fn ensure_parent_dir(file_path: &str) -> anyhow::Result<()> {
    if file_path == ":memory:" {
        return Ok(());
    }
    let Some(parent) = Path::new(file_path).parent() else { return Ok(()) };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    debug!(dir = %parent.display(), "data directory ready");
    Ok(())
}
