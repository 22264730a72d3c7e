//! Spawn scripts and the aggregate recipe-grant script

use std::fs;
use std::path::Path;

/// Create an empty spawn script unless one already exists.
///
/// Returns whether a file was created. Existing scripts are user content
/// and are never touched here.
pub fn ensure_spawn_script(path: &Path) -> Result<bool, std::io::Error> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, "")?;
    tracing::info!("Generated: {} (empty)", path.display());
    Ok(true)
}

pub fn grant_command(namespace: &str, id: &str) -> String {
    format!("recipe give @a {}:{}", namespace, id)
}

/// Rewrite the aggregate script with one grant line per id, in order.
pub fn write_aggregate_script<S: AsRef<str>>(
    path: &Path,
    namespace: &str,
    ids: &[S],
) -> Result<(), std::io::Error> {
    let content: String = ids
        .iter()
        .map(|id| grant_command(namespace, id.as_ref()) + "\n")
        .collect();
    fs::write(path, content)?;
    tracing::info!("Generated: {} ({} recipes)", path.display(), ids.len());
    Ok(())
}
