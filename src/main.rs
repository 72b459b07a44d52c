mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use clipweld::combine::{CombineOptions, CombineOutcome, DirectoryCombiner};
use clipweld::walk::{DirOutcome, TreeWalker};
use clipweld::{config, rename};
use clipweld_av::FfmpegEngine;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on the
    // verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipweld=debug,clipweld_av=debug".to_string()
        } else {
            "clipweld=info,clipweld_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Combine { dir } => combine_folder(&dir, cli.config.as_deref()),
        Commands::Batch { root } => combine_batch(&root, cli.config.as_deref()),
        Commands::Rename { root } => rename_tree(&root),
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("clipweld {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn combine_options(config: &config::CombineConfig) -> CombineOptions {
    CombineOptions {
        extension: config.extension.clone(),
        output_name: config.output_name.clone(),
        staging_dir_name: config.staging_dir_name.clone(),
    }
}

fn engine_from(config: &config::Config) -> Result<FfmpegEngine> {
    FfmpegEngine::with_tool_paths(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    )
    .context("ffmpeg and ffprobe are required; see `clipweld check-tools`")
}

fn combine_folder(dir: &Path, config_path: Option<&Path>) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!("Folder does not exist: {:?}", dir);
    }
    if !dir.is_dir() {
        anyhow::bail!("Not a folder: {:?}", dir);
    }

    let config = config::load_config_or_default(config_path)?;
    let engine = engine_from(&config)?;
    let combiner = DirectoryCombiner::new(&engine, combine_options(&config.combine));

    match combiner.combine_directory(dir) {
        Ok(CombineOutcome::Combined { segments }) => {
            println!("Combined {} files in {}", segments, dir.display());
        }
        Ok(CombineOutcome::AlreadyCombined) => {
            println!("Skipping (already combined): {}", dir.display());
        }
        Ok(CombineOutcome::NoMediaFiles) => {
            println!("No media files found in {}", dir.display());
        }
        Err(e) => {
            println!("Failed to combine {}: {}", dir.display(), e);
        }
    }

    Ok(())
}

fn combine_batch(root: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let engine = engine_from(&config)?;
    let combiner = DirectoryCombiner::new(&engine, combine_options(&config.combine));
    let walker = TreeWalker::new(&combiner);

    let report = walker.run(root)?;

    for (dir, outcome) in &report.outcomes {
        match outcome {
            DirOutcome::Combined { segments } => {
                println!("✓ Combined {} files in {}", segments, dir.display());
            }
            DirOutcome::AlreadyCombined => {
                println!("- Skipping (already combined): {}", dir.display());
            }
            // A directory without media files is simply not a candidate.
            DirOutcome::NoMediaFiles => {}
            DirOutcome::Failed(e) => {
                println!("✗ Failed to combine {}: {}", dir.display(), e);
            }
        }
    }

    println!(
        "\n{} combined, {} skipped, {} failed ({} directories visited)",
        report.combined(),
        report.skipped(),
        report.failed(),
        report.outcomes.len()
    );

    Ok(())
}

fn rename_tree(root: &Path) -> Result<()> {
    let report = rename::sanitize_tree(root)?;

    for entry in &report.renamed {
        println!("Renamed {} -> {}", entry.from.display(), entry.to.display());
    }
    for (path, reason) in &report.failed {
        println!("✗ Failed to rename {}: {}", path.display(), reason);
    }

    println!("\n{} renamed, {} failed", report.renamed.len(), report.failed.len());

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = clipweld_av::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable combining.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Extension: .{}", config.combine.extension);
            println!("  Output name: {}", config.combine.output_name);
            println!("  Staging dir: {}", config.combine.staging_dir_name);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("  Extension: .{}", config.combine.extension);
            println!("  Output name: {}", config.combine.output_name);
            println!("  Staging dir: {}", config.combine.staging_dir_name);
        }
    }

    Ok(())
}
