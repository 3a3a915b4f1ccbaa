//! Validated board configuration.

use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MAX_CARDS_PER_COLUMN: usize = 5;
pub const DEFAULT_NUM_FUTURE_SPRINTS: usize = 6;
pub const DEFAULT_FUTURE_SPRINT_COLUMNS: usize = 6;
pub const DEFAULT_SPRINT_LENGTH_DAYS: u32 = 14;
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Which of several qualifying sprint values wins when a record repeats
/// its sprint column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintResolution {
    First,
    Latest,
}

impl SprintResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            SprintResolution::First => "first",
            SprintResolution::Latest => "latest",
        }
    }
}

impl fmt::Display for SprintResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SprintResolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(SprintResolution::First),
            "latest" | "last" => Ok(SprintResolution::Latest),
            other => Err(format!("Invalid sprint resolution '{other}' (expected first|latest)")),
        }
    }
}

/// Card and spacing dimensions used by the layout synthesizer and the
/// boundary detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub card_width: f64,
    pub card_height: f64,
    pub card_spacing: f64,
    pub epic_spacing: f64,
    pub team_spacing: f64,
    pub team_label_height: f64,
    pub header_offset: f64,
    pub header_height: f64,
    pub content_gap: f64,
    pub capacity_row_height: f64,
    pub separator_width: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            card_width: 240.0,
            card_height: 160.0,
            card_spacing: 20.0,
            epic_spacing: 40.0,
            team_spacing: 400.0,
            team_label_height: 80.0,
            header_offset: 100.0,
            header_height: 60.0,
            content_gap: 30.0,
            capacity_row_height: 28.0,
            separator_width: 2.0,
        }
    }
}

impl LayoutMetrics {
    /// Width of one column slot including the gap to the next slot.
    pub fn unit_column_width(&self) -> f64 {
        self.card_width + self.card_spacing
    }

    fn validate(&self) -> Result<()> {
        let fields: [(&'static str, f64); 11] = [
            ("card_width", self.card_width),
            ("card_height", self.card_height),
            ("card_spacing", self.card_spacing),
            ("epic_spacing", self.epic_spacing),
            ("team_spacing", self.team_spacing),
            ("team_label_height", self.team_label_height),
            ("header_offset", self.header_offset),
            ("header_height", self.header_height),
            ("content_gap", self.content_gap),
            ("capacity_row_height", self.capacity_row_height),
            ("separator_width", self.separator_width),
        ];
        for (field, value) in fields {
            ensure_non_negative(field, value)?;
        }
        ensure_positive("card_width", self.card_width)?;
        ensure_positive("card_height", self.card_height)?;
        // Header row must sit below the team label.
        if self.header_offset < self.team_label_height {
            return Err(BoardError::invalid_config(
                "header_offset",
                "must be at least team_label_height",
            ));
        }
        Ok(())
    }
}

/// Tuning for reconstructing boundaries from placed geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryTuning {
    /// Vertical slack allowed when merging elements into one team band
    pub cluster_tolerance: f64,
    /// How far left/right of a header label to look for a separator
    pub max_separator_distance: f64,
    /// Half-width used around a header label when no separator is found
    pub fallback_half_width: f64,
}

impl Default for BoundaryTuning {
    fn default() -> Self {
        Self { cluster_tolerance: 40.0, max_separator_distance: 4000.0, fallback_half_width: 300.0 }
    }
}

impl BoundaryTuning {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("cluster_tolerance", self.cluster_tolerance)?;
        ensure_positive("max_separator_distance", self.max_separator_distance)?;
        ensure_positive("fallback_half_width", self.fallback_half_width)?;
        Ok(())
    }
}

/// Fully resolved configuration. Only constructed through [`BoardConfig::new`]
/// or the config loader, both of which validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub sprint_resolution: SprintResolution,
    pub max_cards_per_column: usize,
    pub num_future_sprints: usize,
    pub future_sprint_columns: usize,
    pub sprint_length_days: u32,
    pub batch_size: usize,
    pub metrics: LayoutMetrics,
    pub boundary: BoundaryTuning,
}

impl BoardConfig {
    /// Build a config with default tuning. The resolution mode has no
    /// default and must be chosen by the caller.
    pub fn new(sprint_resolution: SprintResolution) -> Self {
        Self {
            sprint_resolution,
            max_cards_per_column: DEFAULT_MAX_CARDS_PER_COLUMN,
            num_future_sprints: DEFAULT_NUM_FUTURE_SPRINTS,
            future_sprint_columns: DEFAULT_FUTURE_SPRINT_COLUMNS,
            sprint_length_days: DEFAULT_SPRINT_LENGTH_DAYS,
            batch_size: DEFAULT_BATCH_SIZE,
            metrics: LayoutMetrics::default(),
            boundary: BoundaryTuning::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cards_per_column == 0 {
            return Err(BoardError::invalid_config("max_cards_per_column", "must be at least 1"));
        }
        if self.future_sprint_columns == 0 {
            return Err(BoardError::invalid_config("future_sprint_columns", "must be at least 1"));
        }
        if self.sprint_length_days == 0 {
            return Err(BoardError::invalid_config("sprint_length_days", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(BoardError::invalid_config("batch_size", "must be at least 1"));
        }
        self.metrics.validate()?;
        self.boundary.validate()?;
        Ok(())
    }
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(BoardError::invalid_config(field, format!("{value} is not a finite number")));
    }
    if value < 0.0 {
        return Err(BoardError::invalid_config(field, format!("{value} is negative")));
    }
    Ok(())
}

fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    ensure_non_negative(field, value)?;
    if value == 0.0 {
        return Err(BoardError::invalid_config(field, "must be greater than zero"));
    }
    Ok(())
}
