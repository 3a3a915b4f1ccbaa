//! Tracker CSV ingest.
//!
//! Tracker exports repeat column names (one `Sprint` column per sprint a
//! ticket passed through), so rows are kept as ordered name/value pairs
//! rather than deserialized into a struct.

use crate::domain::{Element, GeometrySnapshot, RawRecord};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub records: Vec<RawRecord>,
    /// Rows the CSV reader could not decode
    pub malformed_rows: usize,
}

pub fn read_records<R: Read>(reader: R) -> Result<IngestOutcome> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed reading CSV header row")?
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}') } else { h })
        .map(|h| h.trim().to_string())
        .collect();

    let mut outcome = IngestOutcome::default();
    for (index, row) in csv_reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping malformed CSV row {}: {}", index + 2, e);
                outcome.malformed_rows += 1;
                continue;
            }
        };
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        outcome.records.push(RawRecord::new(fields));
    }

    tracing::debug!(
        "Read {} records ({} malformed) with {} columns",
        outcome.records.len(),
        outcome.malformed_rows,
        headers.len()
    );
    Ok(outcome)
}

pub fn read_records_from_path(path: &Path) -> Result<IngestOutcome> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_records(file).with_context(|| format!("Failed to read records from {}", path.display()))
}

/// Snapshot files hold either `{"elements": [...]}` or a bare element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Wrapped(GeometrySnapshot),
    Bare(Vec<Element>),
}

pub fn parse_snapshot(content: &str) -> Result<GeometrySnapshot> {
    let parsed: SnapshotFile = serde_json::from_str(content).context("Invalid geometry snapshot")?;
    Ok(match parsed {
        SnapshotFile::Wrapped(snapshot) => snapshot,
        SnapshotFile::Bare(elements) => GeometrySnapshot::new(elements),
    })
}

pub fn read_snapshot_from_path(path: &Path) -> Result<GeometrySnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    parse_snapshot(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
