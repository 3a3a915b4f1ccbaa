//! Config file loading

use crate::domain::{BoundaryTuning, LayoutMetrics, SprintKey, SprintResolution};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Candidate file names, in discovery order.
pub const CONFIG_CANDIDATES: [&str; 6] = [
    "sprint-board.toml",
    ".sprint-board.toml",
    "sprint-board.yaml",
    ".sprint-board.yaml",
    "sprint-board.yml",
    ".sprint-board.yml",
];

/// Section name accepted for nesting inside a larger config file.
const NESTED_SECTION: &str = "sprint-board";

/// Settings as written in a config file or the environment. Every field is
/// optional; unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_resolution: Option<SprintResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cards_per_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_future_sprints: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_sprint_columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_length_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_sprint: Option<SprintKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<LayoutMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryTuning>,
}

pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<ConfigFile> {
    let config_path_provided = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(root),
    };

    let Some(config_file) = discovered else {
        return Ok(ConfigFile::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(cfg) => {
            tracing::debug!("Loaded config from {}", config_file.display());
            Ok(cfg)
        }
        Err(e) if config_path_provided => Err(e),
        Err(e) => {
            tracing::warn!(
                "Failed to parse auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(ConfigFile::default())
        }
    }
}

/// Parse TOML config, supporting a nested `[sprint-board]` section.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<ConfigFile> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(NESTED_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, supporting a nested `sprint-board:` mapping.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<ConfigFile> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(NESTED_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES.iter().map(|candidate| root.join(candidate)).find(|path| path.exists())
}
