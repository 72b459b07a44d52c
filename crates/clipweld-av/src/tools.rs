//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// First line of the version banner if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check whether a tool is on PATH and responds to `-version`.
pub fn check_tool(name: &str) -> ToolInfo {
    let result = Command::new(name).arg("-version").output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(name).ok(),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check the tools the combine engine depends on: ffmpeg and ffprobe.
pub fn check_tools() -> Vec<ToolInfo> {
    vec![check_tool("ffmpeg"), check_tool("ffprobe")]
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Resolve a tool path, preferring an explicit configured path over PATH
/// lookup. A configured path that does not exist is ignored rather than
/// trusted blindly.
pub fn resolve_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    require_tool(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_tool_reports_missing_binary() {
        let info = check_tool("nonexistent_tool_12345");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn require_tool_errors_on_missing_binary() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn resolve_tool_prefers_existing_configured_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resolved = resolve_tool("nonexistent_tool_12345", Some(file.path())).unwrap();
        assert_eq!(resolved, file.path());
    }

    #[test]
    fn resolve_tool_ignores_missing_configured_path() {
        let err = resolve_tool(
            "nonexistent_tool_12345",
            Some(Path::new("/no/such/binary")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
