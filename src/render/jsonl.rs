//! JSONL rendering of placement instructions, in creation batches.

use crate::layout::Placement;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct BatchedPlacement<'a> {
    batch: usize,
    #[serde(flatten)]
    placement: &'a Placement,
}

/// Split placements into creation batches of at most `batch_size`.
pub fn placement_batches(placements: &[Placement], batch_size: usize) -> std::slice::Chunks<'_, Placement> {
    placements.chunks(batch_size.max(1))
}

/// One JSON object per line, each tagged with its batch index.
pub fn render_jsonl(placements: &[Placement], batch_size: usize) -> Result<String> {
    let mut out = String::new();
    for (batch, chunk) in placement_batches(placements, batch_size).enumerate() {
        for placement in chunk {
            out.push_str(&serde_json::to_string(&BatchedPlacement { batch, placement })?);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Write placements batch by batch, flushing after each batch. Returns the
/// number of batches written.
pub fn write_jsonl(
    path: &Path,
    placements: &[Placement],
    batch_size: usize,
    show_progress: bool,
) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let progress = if show_progress {
        let bar = ProgressBar::new(placements.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} placing [{bar:30}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut batches = 0;
    for (batch, chunk) in placement_batches(placements, batch_size).enumerate() {
        for placement in chunk {
            serde_json::to_writer(&mut writer, &BatchedPlacement { batch, placement })?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        progress.inc(chunk.len() as u64);
        batches += 1;
    }
    progress.finish_and_clear();
    tracing::debug!("Wrote {} placements in {} batches", placements.len(), batches);
    Ok(batches)
}
