//! Epic grouping and board layout synthesis

pub mod capacity;
pub mod grouper;
pub mod placement;
pub mod synth;

pub use capacity::{capacity_summary, CapacityRow, CapacitySummary};
pub use grouper::{
    columns_needed, group_board, group_team, team_order, Epic, EpicCatalog, EpicPresentation,
    SprintColumn, TeamGrouping,
};
pub use placement::{Placement, SlotRange};
pub use synth::{BoardLayout, ColumnSpec, LayoutSynthesizer, TeamRow, MIN_BACKLOG_SLOTS};
