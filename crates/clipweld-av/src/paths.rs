//! Engine-safe path resolution.
//!
//! Some engine builds choke on path forms the host OS accepts, most notably
//! long paths on Windows. The resolver maps a path to an equivalent form the
//! engine can consume, selected per platform at compile time, and always
//! refers to the same underlying file.

use std::path::{Path, PathBuf};

/// Resolve a path to a form safe to hand to the external engine.
///
/// Windows builds resolve to the canonical verbatim form (`\\?\`-prefixed),
/// which is not subject to the legacy MAX_PATH limit. Resolution is
/// best-effort: when the alias cannot be produced the original path is
/// returned unchanged.
#[cfg(windows)]
pub fn engine_safe_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve a path to a form safe to hand to the external engine.
///
/// Non-Windows engines parse any native path, so this is the identity.
#[cfg(not(windows))]
pub fn engine_safe_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
