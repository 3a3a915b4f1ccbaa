//! Configuration loading and merging
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults).

pub mod loader;
pub mod merge;

pub use loader::{load_config, ConfigFile};
pub use merge::{merge_cli_with_config, overlay_env, CliOverrides, Settings};

use anyhow::Result;
use std::path::Path;

/// Load every layer and merge it with the CLI values.
pub fn resolve_settings(
    root: &Path,
    config_path: Option<&Path>,
    cli: &CliOverrides,
) -> Result<Settings> {
    let file = load_config(root, config_path)?;
    let layered = overlay_env(file)?;
    Ok(merge_cli_with_config(layered, cli)?)
}
