use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub combine: CombineConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CombineConfig {
    /// Recognized media extension, matched case-insensitively, without dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Name of the combined output file. This file doubles as the
    /// processed marker: a directory containing it is skipped.
    #[serde(default = "default_output_name")]
    pub output_name: String,

    /// Name of the per-directory scratch directory.
    #[serde(default = "default_staging_dir_name")]
    pub staging_dir_name: String,
}

fn default_extension() -> String {
    "mp4".to_string()
}
fn default_output_name() -> String {
    "combined.mp4".to_string()
}
fn default_staging_dir_name() -> String {
    "temp_combiner".to_string()
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            output_name: default_output_name(),
            staging_dir_name: default_staging_dir_name(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffmpeg binary; PATH lookup when unset.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Explicit ffprobe binary; PATH lookup when unset.
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
