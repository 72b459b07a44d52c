//! Scratch-directory lifecycle for one source directory.

use crate::sanitize::sanitize_name;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A media file found directly inside a source directory.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Original file name.
    pub name: String,
    /// Full path of the original file.
    pub path: PathBuf,
}

/// A copy of a media file inside the staging area, under a sanitized name.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Sanitized (and, on collision, disambiguated) name.
    pub name: String,
    /// Full path of the staged copy.
    pub path: PathBuf,
}

/// Scratch directory for one source directory's processing.
///
/// Created at a fixed relative name under the source directory and removed
/// on drop, so every exit path of the owning pipeline releases the scratch
/// space. Originals are only ever copied, never touched.
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create the staging directory under `base`, tolerating pre-existence.
    ///
    /// A leftover directory from an interrupted run is adopted as-is; its
    /// contents go away with the rest of the scratch space on drop.
    pub fn create(base: &Path, dir_name: &str) -> io::Result<Self> {
        let root = base.join(dir_name);
        match fs::create_dir(&root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("adopting existing staging directory {:?}", root);
            }
            Err(e) => return Err(e),
        }
        Ok(Self { root })
    }

    /// Path of the staging directory itself.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the staging directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Copy `sources` into the staging area under sanitized names, in the
    /// given order, returning the staged files in that same order.
    ///
    /// Two sources whose names sanitize to the same string both survive: the
    /// later one gets a numeric suffix before its extension.
    pub fn stage(&self, sources: &[MediaFile]) -> io::Result<Vec<StagedFile>> {
        let mut taken = HashSet::new();
        let mut staged = Vec::with_capacity(sources.len());

        for source in sources {
            let name = disambiguate(sanitize_name(&source.name), &mut taken);
            let dest = self.root.join(&name);
            fs::copy(&source.path, &dest)?;
            debug!("staged {:?} as {}", source.path, name);
            staged.push(StagedFile { name, path: dest });
        }

        Ok(staged)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.root) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("failed to remove staging directory {:?}: {}", self.root, e);
            }
        }
    }
}

/// Claim `name` in `taken`, appending `-2`, `-3`, ... before the extension
/// until the name is free.
fn disambiguate(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name, String::new()),
    };

    let mut n = 2u32;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
