//! Output rendering (placement JSONL, reports, CSV export)

pub mod export;
pub mod jsonl;
pub mod report;

pub use export::write_export_csv;
pub use jsonl::{placement_batches, render_jsonl, write_jsonl};
pub use report::{write_reconcile_report, write_report};
