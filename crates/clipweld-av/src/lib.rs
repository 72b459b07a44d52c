//! Media engine boundary for clipweld.
//!
//! Everything that talks to the external media tools lives here: tool
//! discovery, engine-safe path resolution, and the [`MediaCombineEngine`]
//! contract with its ffmpeg-backed implementation. The application crate
//! stays ignorant of how clips are actually decoded and joined.

pub mod engine;
pub mod error;
pub mod paths;
pub mod tools;

pub use engine::{ConcatList, FfmpegEngine, MediaCombineEngine, SourceClip};
pub use error::{Error, Result};
pub use tools::{check_tool, check_tools, require_tool, resolve_tool, ToolInfo};
