//! Recursive batch traversal.
//!
//! Walks a tree, runs the per-directory combiner on every directory
//! (including the root), and collects one outcome per directory so callers
//! can detect partial failure programmatically. One bad directory never
//! aborts the batch.

use crate::combine::{CombineError, CombineOutcome, DirectoryCombiner};
use clipweld_av::MediaCombineEngine;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Outcome of visiting one directory during a batch run.
#[derive(Debug)]
pub enum DirOutcome {
    /// Segments were combined into the marker file.
    Combined { segments: usize },
    /// The marker already exists; skipped.
    AlreadyCombined,
    /// No media files; skipped.
    NoMediaFiles,
    /// Processing aborted; the directory is untouched.
    Failed(CombineError),
}

impl From<Result<CombineOutcome, CombineError>> for DirOutcome {
    fn from(result: Result<CombineOutcome, CombineError>) -> Self {
        match result {
            Ok(CombineOutcome::Combined { segments }) => DirOutcome::Combined { segments },
            Ok(CombineOutcome::AlreadyCombined) => DirOutcome::AlreadyCombined,
            Ok(CombineOutcome::NoMediaFiles) => DirOutcome::NoMediaFiles,
            Err(e) => DirOutcome::Failed(e),
        }
    }
}

/// Aggregate result of a batch run: one outcome per directory visited.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(PathBuf, DirOutcome)>,
}

impl BatchReport {
    /// Directories that were combined in this run.
    pub fn combined(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DirOutcome::Combined { .. }))
            .count()
    }

    /// Directories skipped as already combined or holding no media.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| {
                matches!(o, DirOutcome::AlreadyCombined | DirOutcome::NoMediaFiles)
            })
            .count()
    }

    /// Directories whose processing failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DirOutcome::Failed(_)))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Errors fatal to a whole walk invocation. Everything else is a
/// per-directory outcome.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("path not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),
}

/// Visits every directory under a root (root included) exactly once.
pub struct TreeWalker<'a, E: MediaCombineEngine> {
    combiner: &'a DirectoryCombiner<'a, E>,
}

impl<'a, E: MediaCombineEngine> TreeWalker<'a, E> {
    pub fn new(combiner: &'a DirectoryCombiner<'a, E>) -> Self {
        Self { combiner }
    }

    /// Walk the tree and combine each directory, continuing past failures.
    pub fn run(&self, root: &Path) -> Result<BatchReport, WalkError> {
        if !root.exists() {
            return Err(WalkError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(WalkError::RootNotDirectory(root.to_path_buf()));
        }

        // Snapshot the directory set before combining anything, so scratch
        // directories created mid-run are never visited. Symlinks are not
        // followed, which also rules out traversal cycles. Leftover staging
        // directories from an interrupted run are not source directories.
        let staging_name = self.combiner.options().staging_dir_name.clone();
        let dirs: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name().to_str() != Some(staging_name.as_str()))
            .filter_map(|entry| match entry {
                Ok(e) if e.file_type().is_dir() => Some(e.into_path()),
                Ok(_) => None,
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    None
                }
            })
            .collect();

        info!("walking {} directories under {:?}", dirs.len(), root);

        let mut report = BatchReport::default();
        for dir in dirs {
            let outcome = DirOutcome::from(self.combiner.combine_directory(&dir));
            match &outcome {
                DirOutcome::Combined { segments } => {
                    info!("combined {} segments in {:?}", segments, dir)
                }
                DirOutcome::AlreadyCombined => info!("already combined: {:?}", dir),
                DirOutcome::NoMediaFiles => {}
                DirOutcome::Failed(e) => warn!("failed to combine {:?}: {}", dir, e),
            }
            report.outcomes.push((dir, outcome));
        }

        Ok(report)
    }
}
