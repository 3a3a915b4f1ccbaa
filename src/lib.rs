//! sprint-board: lay out tracker exports as team/sprint planning boards.
//!
//! Records are classified into tickets, grouped by team, sprint and epic,
//! and turned into absolute placement instructions. Placed boards can be
//! read back as geometry snapshots, reclassified from their separators and
//! header labels, and reconciled when the same issue appears twice.

pub mod classify;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod reconcile;
pub mod render;
pub mod utils;

pub use context::BoardContext;
pub use error::{BoardError, Result};
