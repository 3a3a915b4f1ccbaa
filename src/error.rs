//! Library error types.
//!
//! Nothing a single record or element can do is fatal to a pass; the only
//! hard failures are structurally invalid configuration values, which are
//! rejected before any processing starts.

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    /// A configuration value is out of range or not a finite number
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The sprint resolution mode was not set anywhere
    #[error("sprint_resolution must be set explicitly (first|latest)")]
    MissingSprintResolution,

    /// A sprint key string did not parse
    #[error("Invalid sprint key '{0}': expected YEAR-NUMBER or Backlog")]
    InvalidSprintKey(String),
}

impl BoardError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig { field, reason: reason.into() }
    }
}
