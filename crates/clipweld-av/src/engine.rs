//! The combine-engine boundary and its ffmpeg-backed implementation.
//!
//! The engine contract is three operations: open a clip (decode validation),
//! concatenate an ordered sequence of opened clips, and write the result to a
//! destination path. Callers point the destination inside their own scratch
//! space, so a partially written output is never observable at a final path.

use crate::tools::resolve_tool;
use crate::{Error, Result};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A media engine that can open clips, concatenate them in order, and write
/// the combined result.
pub trait MediaCombineEngine {
    /// An opened, decode-validated clip.
    type Clip;
    /// The concatenation of an ordered sequence of clips, not yet written.
    type Combined;

    /// Open a clip for reading, validating that the engine can decode it.
    fn open(&self, path: &Path) -> Result<Self::Clip>;

    /// Combine clips in the given order. Order is preserved verbatim.
    fn concatenate(&self, clips: Vec<Self::Clip>) -> Result<Self::Combined>;

    /// Materialize the combined result at `dest` as a complete container
    /// file. On failure no complete file exists at `dest`.
    fn write(&self, combined: Self::Combined, dest: &Path) -> Result<()>;
}

/// A clip opened by [`FfmpegEngine`]: the probed source path.
#[derive(Debug, Clone)]
pub struct SourceClip {
    path: PathBuf,
    duration: Option<f64>,
}

impl SourceClip {
    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container duration in seconds, when the probe reports one.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }
}

/// A pending concatenation: an ffconcat playlist referencing the clips in
/// order. The playlist file lives until the value is dropped.
pub struct ConcatList {
    playlist: NamedTempFile,
    segments: usize,
}

impl ConcatList {
    /// Number of segments in the playlist.
    pub fn segments(&self) -> usize {
        self.segments
    }
}

/// Combine engine backed by the ffmpeg and ffprobe CLI tools.
///
/// Clips are validated with ffprobe and joined with the concat demuxer in
/// stream-copy mode, so combining is a remux rather than a re-encode.
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegEngine {
    /// Locate ffmpeg and ffprobe on PATH.
    ///
    /// # Errors
    ///
    /// Returns an error if either tool is missing.
    pub fn new() -> Result<Self> {
        Self::with_tool_paths(None, None)
    }

    /// Locate the tools, preferring explicitly configured paths.
    pub fn with_tool_paths(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<Self> {
        Ok(Self {
            ffmpeg: resolve_tool("ffmpeg", ffmpeg)?,
            ffprobe: resolve_tool("ffprobe", ffprobe)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeReport {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
}

impl MediaCombineEngine for FfmpegEngine {
    type Clip = SourceClip;
    type Combined = ConcatList;

    fn open(&self, path: &Path) -> Result<SourceClip> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found("ffprobe")
                } else {
                    Error::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => "ffprobe rejected the file".to_string(),
                s => s.to_string(),
            };
            return Err(Error::decode(path, message));
        }

        let report: FfprobeReport = serde_json::from_slice(&output.stdout)?;

        if report.streams.is_empty() {
            return Err(Error::decode(path, "no decodable streams"));
        }

        let duration = report
            .format
            .and_then(|f| f.duration)
            .and_then(|s| s.parse::<f64>().ok());

        debug!(
            "opened {:?}: {} streams ({})",
            path,
            report.streams.len(),
            report
                .streams
                .iter()
                .filter_map(|s| s.codec_type.as_deref())
                .collect::<Vec<_>>()
                .join("+"),
        );

        Ok(SourceClip {
            path: path.to_path_buf(),
            duration,
        })
    }

    fn concatenate(&self, clips: Vec<SourceClip>) -> Result<ConcatList> {
        if clips.is_empty() {
            return Err(Error::InvalidInput(
                "cannot concatenate zero clips".to_string(),
            ));
        }

        let mut playlist = NamedTempFile::new()?;
        playlist.write_all(render_playlist(&clips).as_bytes())?;
        playlist.flush()?;

        debug!(
            "playlist of {} segments at {:?}",
            clips.len(),
            playlist.path()
        );

        Ok(ConcatList {
            playlist,
            segments: clips.len(),
        })
    }

    fn write(&self, combined: ConcatList, dest: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args([
            "-hide_banner",
            "-nostdin",
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ])
        .arg(combined.playlist.path())
        .args(["-c", "copy"]);

        if wants_faststart(dest) {
            cmd.args(["-movflags", "+faststart"]);
        }

        cmd.arg(dest);

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffmpeg")
            } else {
                Error::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::encode(stderr.trim().to_string()));
        }

        info!("wrote {} combined segments to {:?}", combined.segments, dest);
        Ok(())
    }
}

/// Render the ffconcat playlist for an ordered clip sequence.
fn render_playlist(clips: &[SourceClip]) -> String {
    let mut playlist = String::from("ffconcat version 1.0\n");
    for clip in clips {
        playlist.push_str(&format!("file '{}'\n", escape_concat_path(&clip.path)));
    }
    playlist
}

/// Escape a path for a single-quoted ffconcat directive: close the quote,
/// emit an escaped quote, reopen.
fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

fn wants_faststart(dest: &Path) -> bool {
    dest.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "mp4" | "m4v" | "mov"))
        .unwrap_or(false)
}
