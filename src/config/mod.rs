mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./clipweld.toml", "~/.config/clipweld/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    let combine = &config.combine;

    if combine.extension.is_empty() || combine.extension.contains('.') {
        anyhow::bail!(
            "combine.extension must be a bare extension without dot, got {:?}",
            combine.extension
        );
    }

    if combine.output_name.is_empty() || combine.output_name.chars().any(std::path::is_separator) {
        anyhow::bail!(
            "combine.output_name must be a plain file name, got {:?}",
            combine.output_name
        );
    }

    let expected_suffix = format!(".{}", combine.extension.to_ascii_lowercase());
    if !combine
        .output_name
        .to_ascii_lowercase()
        .ends_with(&expected_suffix)
    {
        anyhow::bail!(
            "combine.output_name {:?} must carry the media extension {:?}",
            combine.output_name,
            combine.extension
        );
    }

    if combine.staging_dir_name.is_empty()
        || combine.staging_dir_name.chars().any(std::path::is_separator)
        || combine.staging_dir_name == "."
        || combine.staging_dir_name == ".."
    {
        anyhow::bail!(
            "combine.staging_dir_name must be a single directory name, got {:?}",
            combine.staging_dir_name
        );
    }

    for (name, path) in [
        ("ffmpeg_path", &config.tools.ffmpeg_path),
        ("ffprobe_path", &config.tools.ffprobe_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("tools.{} does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}
