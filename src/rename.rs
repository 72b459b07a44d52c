//! Tree-wide filename sanitization.
//!
//! Renames every file, then every directory, under a root so their names
//! pass [`crate::sanitize::sanitize_name`] unchanged. Files go first since
//! their renames never move a directory; directories go deepest-first so a
//! parent rename never invalidates a pending child path.

use crate::sanitize::sanitize_name;
use crate::walk::WalkError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// One rename performed.
#[derive(Debug)]
pub struct RenameEntry {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Result of a sanitization pass.
#[derive(Debug, Default)]
pub struct RenameReport {
    /// Renames performed, in execution order.
    pub renamed: Vec<RenameEntry>,
    /// Paths that could not be renamed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Sanitize every file and directory name under `root`.
///
/// The root itself is never renamed. A sibling already occupying a target
/// name fails that single rename; the walk continues.
pub fn sanitize_tree(root: &Path) -> Result<RenameReport, WalkError> {
    if !root.exists() {
        return Err(WalkError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(WalkError::RootNotDirectory(root.to_path_buf()));
    }

    let mut report = RenameReport::default();

    // Snapshot before renaming anything; mutating a tree mid-walk is asking
    // for entries to be seen twice or not at all.
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                report
                    .failed
                    .push((e.path().map(Path::to_path_buf).unwrap_or_default(), e.to_string()));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            dirs.push((entry.depth(), entry.into_path()));
        } else {
            files.push(entry.into_path());
        }
    }

    for file in files {
        try_rename(&file, &mut report);
    }

    dirs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, dir) in dirs {
        try_rename(&dir, &mut report);
    }

    Ok(report)
}

fn try_rename(path: &Path, report: &mut RenameReport) {
    // Names that are not valid UTF-8 are left alone.
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return;
    };

    let clean = sanitize_name(name);
    if clean == name {
        return;
    }

    let target = path.with_file_name(&clean);
    if target.exists() {
        report.failed.push((
            path.to_path_buf(),
            format!("target already exists: {}", target.display()),
        ));
        return;
    }

    match fs::rename(path, &target) {
        Ok(()) => {
            info!("renamed {:?} -> {:?}", path, target);
            report.renamed.push(RenameEntry {
                from: path.to_path_buf(),
                to: target,
            });
        }
        Err(e) => report.failed.push((path.to_path_buf(), e.to_string())),
    }
}
