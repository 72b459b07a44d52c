//! Per-directory combine orchestration.
//!
//! One [`DirectoryCombiner`] invocation takes a source directory end to end:
//! eligibility check, staging, engine invocation, atomic relocation of the
//! output, and unconditional scratch cleanup.

use crate::staging::{MediaFile, StagingArea};
use clipweld_av::paths::engine_safe_path;
use clipweld_av::MediaCombineEngine;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors that abort processing of a single source directory.
///
/// None of these escape past the tree walker; the directory is reported as
/// failed and the batch moves on.
#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    /// The directory could not be listed.
    #[error("failed to list {}: {source}", dir.display())]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying inputs into the staging area failed.
    #[error("failed to stage inputs: {0}")]
    Staging(#[source] io::Error),

    /// The media engine rejected or failed on the staged inputs.
    #[error(transparent)]
    Engine(#[from] clipweld_av::Error),

    /// The combined output could not be moved to its final location.
    #[error("failed to move combined output into place: {0}")]
    Relocate(#[source] io::Error),
}

/// What happened to one source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineOutcome {
    /// This many segments were combined into the marker file.
    Combined { segments: usize },
    /// The marker already exists; the directory was skipped.
    AlreadyCombined,
    /// The directory holds no media files; nothing to do.
    NoMediaFiles,
}

/// Knobs for the combine pipeline.
///
/// Defaults mirror the names the pipeline is known by: `.mp4` inputs, a
/// `combined.mp4` output doubling as the processed marker, `temp_combiner`
/// scratch space.
#[derive(Debug, Clone)]
pub struct CombineOptions {
    /// Recognized media extension, matched case-insensitively, without dot.
    pub extension: String,
    /// Name of the combined output inside the source directory.
    pub output_name: String,
    /// Name of the per-directory scratch directory.
    pub staging_dir_name: String,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            extension: "mp4".to_string(),
            output_name: "combined.mp4".to_string(),
            staging_dir_name: "temp_combiner".to_string(),
        }
    }
}

/// What a directory listing found: the marker, and the media files sorted by
/// original name.
struct DirListing {
    marker_present: bool,
    media: Vec<MediaFile>,
}

/// Orchestrates one source directory end to end.
pub struct DirectoryCombiner<'a, E: MediaCombineEngine> {
    engine: &'a E,
    options: CombineOptions,
}

impl<'a, E: MediaCombineEngine> DirectoryCombiner<'a, E> {
    pub fn new(engine: &'a E, options: CombineOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &CombineOptions {
        &self.options
    }

    /// Process one source directory.
    ///
    /// Soft skips (marker present, no media files) are outcomes, not errors.
    /// On success the directory holds its original files plus the marker; on
    /// failure it is exactly as it was. Scratch space is gone either way.
    pub fn combine_directory(&self, dir: &Path) -> Result<CombineOutcome, CombineError> {
        let listing = self.scan(dir)?;

        if listing.marker_present {
            debug!("skipping {:?}: marker present", dir);
            return Ok(CombineOutcome::AlreadyCombined);
        }
        if listing.media.is_empty() {
            debug!("skipping {:?}: no media files", dir);
            return Ok(CombineOutcome::NoMediaFiles);
        }

        info!("combining {} segments in {:?}", listing.media.len(), dir);

        let staging = StagingArea::create(dir, &self.options.staging_dir_name)
            .map_err(CombineError::Staging)?;

        // The staging guard removes the scratch directory when this frame
        // unwinds, no matter which step below failed.
        self.combine_staged(dir, &staging, &listing.media)
    }

    /// Steps 2-4: stage, combine through the engine, relocate.
    fn combine_staged(
        &self,
        dir: &Path,
        staging: &StagingArea,
        media: &[MediaFile],
    ) -> Result<CombineOutcome, CombineError> {
        let staged = staging.stage(media).map_err(CombineError::Staging)?;

        let mut clips = Vec::with_capacity(staged.len());
        for file in &staged {
            let engine_path = engine_safe_path(&file.path);
            clips.push(self.engine.open(&engine_path)?);
        }

        let combined = self.engine.concatenate(clips)?;

        // The engine writes into the scratch directory; the marker path only
        // ever sees a complete file.
        let scratch_output = staging.file(&self.options.output_name);
        self.engine.write(combined, &scratch_output)?;

        relocate(&scratch_output, &dir.join(&self.options.output_name))
            .map_err(CombineError::Relocate)?;

        Ok(CombineOutcome::Combined {
            segments: staged.len(),
        })
    }

    /// List a directory once, detecting the marker and collecting media
    /// files sorted by original name.
    fn scan(&self, dir: &Path) -> Result<DirListing, CombineError> {
        let read_err = |source| CombineError::List {
            dir: dir.to_path_buf(),
            source,
        };

        let mut listing = DirListing {
            marker_present: false,
            media: Vec::new(),
        };

        for entry in fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if !entry.file_type().map_err(read_err)?.is_file() {
                continue;
            }
            // Non-UTF-8 names are never combine candidates.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };

            if name.eq_ignore_ascii_case(&self.options.output_name) {
                listing.marker_present = true;
            } else if has_extension(&name, &self.options.extension) {
                listing.media.push(MediaFile {
                    name,
                    path: entry.path(),
                });
            }
        }

        listing.media.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }
}

/// Move the combined output from scratch to its final marker path.
///
/// A plain rename when both sides share a filesystem; otherwise copy to a
/// temporary sibling of the destination and rename into place, so a partial
/// file is never observable at the marker path.
fn relocate(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!("rename failed ({rename_err}), copying across filesystems");
            let tmp = dest.with_extension("part");
            if let Err(e) = fs::copy(src, &tmp) {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
            fs::rename(&tmp, dest).map_err(|e| {
                let _ = fs::remove_file(&tmp);
                e
            })?;
            let _ = fs::remove_file(src);
            Ok(())
        }
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
