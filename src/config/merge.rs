//! Layer merging: CLI > Env > File > Defaults.

use super::loader::ConfigFile;
use crate::domain::{BoardConfig, SprintKey, SprintResolution};
use crate::error::{BoardError, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;

/// Prefix of environment overrides, e.g. `SPRINT_BOARD_MAX_CARDS_PER_COLUMN`.
/// Nested values use `__`: `SPRINT_BOARD_METRICS__CARD_WIDTH`.
pub const ENV_PREFIX: &str = "SPRINT_BOARD_";

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sprint_resolution: Option<SprintResolution>,
    pub max_cards_per_column: Option<usize>,
    pub num_future_sprints: Option<usize>,
    pub batch_size: Option<usize>,
    pub current_sprint: Option<SprintKey>,
}

/// A validated board configuration plus run-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub board: BoardConfig,
    /// Anchor for generated future sprints
    pub current_sprint: Option<SprintKey>,
}

/// Overlay `SPRINT_BOARD_*` environment variables on a file config.
pub fn overlay_env(file: ConfigFile) -> anyhow::Result<ConfigFile> {
    overlay_env_with_prefix(file, ENV_PREFIX)
}

pub fn overlay_env_with_prefix(file: ConfigFile, prefix: &str) -> anyhow::Result<ConfigFile> {
    use anyhow::Context;

    Figment::from(Serialized::defaults(file))
        .merge(Env::prefixed(prefix).split("__"))
        .extract()
        .with_context(|| format!("Invalid {prefix}* environment configuration"))
}

/// Merge CLI values over the layered config and validate the result.
///
/// Fails when no layer sets the sprint resolution mode.
pub fn merge_cli_with_config(config: ConfigFile, cli: &CliOverrides) -> Result<Settings> {
    let resolution = cli
        .sprint_resolution
        .or(config.sprint_resolution)
        .ok_or(BoardError::MissingSprintResolution)?;

    let mut board = BoardConfig::new(resolution);
    if let Some(value) = cli.max_cards_per_column.or(config.max_cards_per_column) {
        board.max_cards_per_column = value;
    }
    if let Some(value) = cli.num_future_sprints.or(config.num_future_sprints) {
        board.num_future_sprints = value;
    }
    if let Some(value) = config.future_sprint_columns {
        board.future_sprint_columns = value;
    }
    if let Some(value) = config.sprint_length_days {
        board.sprint_length_days = value;
    }
    if let Some(value) = cli.batch_size.or(config.batch_size) {
        board.batch_size = value;
    }
    if let Some(metrics) = config.metrics {
        board.metrics = metrics;
    }
    if let Some(boundary) = config.boundary {
        board.boundary = boundary;
    }
    board.validate()?;

    Ok(Settings { board, current_sprint: cli.current_sprint.or(config.current_sprint) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resolution_fails_fast() {
        let err = merge_cli_with_config(ConfigFile::default(), &CliOverrides::default())
            .expect_err("no resolution");
        assert_eq!(err, BoardError::MissingSprintResolution);
    }

    #[test]
    fn cli_wins_over_file() {
        let file = ConfigFile {
            sprint_resolution: Some(SprintResolution::First),
            max_cards_per_column: Some(4),
            batch_size: Some(10),
            ..Default::default()
        };
        let cli = CliOverrides {
            sprint_resolution: Some(SprintResolution::Latest),
            max_cards_per_column: Some(8),
            ..Default::default()
        };
        let settings = merge_cli_with_config(file, &cli).expect("settings");
        assert_eq!(settings.board.sprint_resolution, SprintResolution::Latest);
        assert_eq!(settings.board.max_cards_per_column, 8);
        assert_eq!(settings.board.batch_size, 10);
    }

    #[test]
    fn invalid_merged_value_is_rejected() {
        let file = ConfigFile {
            sprint_resolution: Some(SprintResolution::First),
            max_cards_per_column: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            merge_cli_with_config(file, &CliOverrides::default()),
            Err(BoardError::InvalidConfig { field: "max_cards_per_column", .. })
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        // Unique prefix so parallel tests never see these variables.
        std::env::set_var("SB_MERGE_TEST_MAX_CARDS_PER_COLUMN", "7");
        std::env::set_var("SB_MERGE_TEST_METRICS__CARD_WIDTH", "300");
        let file = ConfigFile {
            sprint_resolution: Some(SprintResolution::First),
            max_cards_per_column: Some(4),
            batch_size: Some(10),
            ..Default::default()
        };
        let merged = overlay_env_with_prefix(file, "SB_MERGE_TEST_").expect("env");
        assert_eq!(merged.max_cards_per_column, Some(7));
        assert_eq!(merged.batch_size, Some(10));
        assert_eq!(merged.sprint_resolution, Some(SprintResolution::First));
        assert_eq!(merged.metrics.expect("metrics").card_width, 300.0);
    }
}
