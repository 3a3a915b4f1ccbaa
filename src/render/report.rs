//! Report JSON generation.

use crate::classify::ClassifyOutcome;
use crate::domain::REPORT_SCHEMA_VERSION;
use crate::layout::BoardLayout;
use crate::reconcile::ReconcileOutcome;
use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::path::Path;

fn report_base(include_timestamp: bool) -> Map<String, Value> {
    let mut report = Map::new();
    report.insert("schema_version".to_string(), Value::String(REPORT_SCHEMA_VERSION.to_string()));
    if include_timestamp {
        report.insert(
            "generated_at".to_string(),
            Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
        );
    }
    report
}

fn write_json(path: &Path, report: Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&Value::Object(report))?)?;
    Ok(())
}

/// `report.json` of a layout run.
pub fn write_report(
    report_path: &Path,
    malformed_rows: usize,
    outcome: &ClassifyOutcome,
    layout: &BoardLayout,
    output_files: &[String],
    config: &Value,
    include_timestamp: bool,
) -> Result<()> {
    let mut sorted_output_files = output_files.to_vec();
    sorted_output_files.sort();

    let columns = layout
        .columns
        .iter()
        .map(|c| {
            json!({
                "sprint": c.sprint_key,
                "slots": c.slots.len(),
                "x": c.x,
                "width": c.width,
                "future": c.future,
            })
        })
        .collect::<Vec<_>>();

    let mut stats = outcome.stats.to_report_value();
    stats["malformed_rows"] = json!(malformed_rows);

    let mut report = report_base(include_timestamp);
    report.insert("stats".to_string(), stats);
    report.insert("layout".to_string(), serde_json::to_value(&layout.stats)?);
    report.insert("columns".to_string(), Value::Array(columns));
    report.insert("teams".to_string(), serde_json::to_value(&layout.teams)?);
    report.insert("config".to_string(), config.clone());
    report.insert("output_files".to_string(), serde_json::to_value(sorted_output_files)?);
    write_json(report_path, report)
}

/// `reconcile.json`: boundaries, assignments, duplicate groups and mutations.
pub fn write_reconcile_report(
    report_path: &Path,
    outcome: &ReconcileOutcome,
    include_timestamp: bool,
) -> Result<()> {
    let mut report = report_base(include_timestamp);
    report.insert("stats".to_string(), serde_json::to_value(&outcome.stats)?);
    report.insert("boundaries".to_string(), serde_json::to_value(&outcome.boundaries.bands)?);
    report.insert("assignments".to_string(), serde_json::to_value(&outcome.assignments)?);
    report.insert("duplicates".to_string(), serde_json::to_value(&outcome.duplicates)?);
    report.insert("mutations".to_string(), serde_json::to_value(&outcome.mutations)?);
    write_json(report_path, report)
}
