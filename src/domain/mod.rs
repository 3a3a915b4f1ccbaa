//! Core value types shared across classification, layout and reconciliation.

pub mod config;
pub mod geometry;
pub mod record;
pub mod sprint_key;
pub mod stats;
pub mod ticket;

pub use config::{BoardConfig, BoundaryTuning, LayoutMetrics, SprintResolution};
pub use geometry::{Element, ElementId, ElementMeta, ElementRole, GeometrySnapshot, Rect};
pub use record::RawRecord;
pub use sprint_key::{SprintKey, BACKLOG, MAX_SPRINT_NUMBER};
pub use stats::{ClassifyStats, LayoutStats, ReconcileStats};
pub use ticket::{CardKind, DisplayField, Ticket, EPIC_LABEL_FIELDS, NO_EPIC, UNKNOWN_TEAM};

/// Version of the JSON written to `report.json` and `reconcile.json`.
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";
