use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipweld")]
#[command(author, version, about = "Batch combiner for directories of segmented video files")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Combine the media files directly inside one folder
    Combine {
        /// Folder holding the segments
        #[arg(required = true)]
        dir: PathBuf,
    },

    /// Combine every eligible folder under a root, including the root
    Batch {
        /// Root of the tree to process
        #[arg(required = true)]
        root: PathBuf,
    },

    /// Sanitize every file and folder name under a root
    Rename {
        /// Root of the tree to sanitize
        #[arg(required = true)]
        root: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
