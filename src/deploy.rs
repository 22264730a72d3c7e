//! Deployment - mirror the generated tree into a datapack folder
//!
//! The destination's previous contents are removed first; it ends up as an
//! exact copy of the source tree.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::pipeline::PipelineError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployReport {
    pub destination: PathBuf,
    pub removed_entries: usize,
    pub copied_files: usize,
}

pub fn deploy(source: &Path, destination: &Path) -> Result<DeployReport, PipelineError> {
    if !source.is_dir() {
        return Err(PipelineError::Deploy(format!(
            "source {} is not a directory",
            source.display()
        )));
    }

    let source_abs = source.canonicalize()?;
    let destination_abs = resolve(destination)?;
    if destination_abs.starts_with(&source_abs) || source_abs.starts_with(&destination_abs) {
        return Err(PipelineError::Deploy(format!(
            "{} and {} overlap",
            source.display(),
            destination.display()
        )));
    }
    fs::create_dir_all(destination)?;

    let mut report = DeployReport {
        destination: destination.to_path_buf(),
        ..Default::default()
    };

    for entry in fs::read_dir(destination)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        report.removed_entries += 1;
    }

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| PipelineError::Deploy(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| PipelineError::Deploy(e.to_string()))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            report.copied_files += 1;
        }
    }

    tracing::info!(
        "Deployed {} file(s) to {} ({} stale entries removed)",
        report.copied_files,
        destination.display(),
        report.removed_entries
    );
    Ok(report)
}

/// Absolute form of a path that may not exist yet: the nearest existing
/// ancestor is canonicalized and the missing tail appended.
fn resolve(path: &Path) -> Result<PathBuf, std::io::Error> {
    let path = std::env::current_dir()?.join(path);
    let mut missing = vec![];
    let mut existing = path.as_path();
    while !existing.exists() {
        let Some(parent) = existing.parent() else { break };
        missing.push(existing.components().next_back());
        existing = parent;
    }

    let mut resolved = existing.canonicalize()?;
    for component in missing.into_iter().rev().flatten() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => resolved.push(name),
            _ => {}
        }
    }
    Ok(resolved)
}
