//! Layout command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use super::utils::{print_heading, print_stat, settings, show_progress, BoardOptions};
use crate::context::BoardContext;
use crate::domain::SprintKey;
use crate::ingest::read_records_from_path;
use crate::render::{write_jsonl, write_report};

#[derive(Args)]
pub struct LayoutArgs {
    /// Tracker CSV export
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "out")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub board: BoardOptions,

    /// Number of empty future sprints to append
    #[arg(long, value_name = "N")]
    pub future_sprints: Option<usize>,

    /// Placements per creation batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Anchor future sprints at this key (e.g. 2025-12)
    #[arg(long, value_name = "KEY")]
    pub current_sprint: Option<SprintKey>,

    /// Omit generated_at from report.json
    #[arg(long)]
    pub no_timestamp: bool,

    /// Never draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn run(args: LayoutArgs) -> Result<()> {
    let started = Instant::now();
    let mut overrides = args.board.overrides();
    overrides.num_future_sprints = args.future_sprints;
    overrides.batch_size = args.batch_size;
    overrides.current_sprint = args.current_sprint;

    let settings = settings(args.board.config.as_deref(), &overrides)?;
    let ctx = BoardContext::new(settings.board)?.with_current_sprint(settings.current_sprint);

    let ingest = read_records_from_path(&args.input)?;
    let (outcome, layout) = ctx.layout_records(&ingest.records);

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("Failed to create output directory {}", args.output_dir.display())
    })?;
    let placements_path = args.output_dir.join("placements.jsonl");
    let report_path = args.output_dir.join("report.json");

    let batches = write_jsonl(
        &placements_path,
        &layout.placements,
        ctx.config().batch_size,
        show_progress(args.no_progress),
    )?;
    let output_files = vec![
        placements_path.display().to_string(),
        report_path.display().to_string(),
    ];
    write_report(
        &report_path,
        ingest.malformed_rows,
        &outcome,
        &layout,
        &output_files,
        &serde_json::to_value(ctx.config())?,
        !args.no_timestamp,
    )?;

    let stats = &outcome.stats;
    print_heading("Layout complete!");
    print_stat("Records", stats.records_total);
    print_stat("Tickets placed", stats.tickets_classified.saturating_sub(layout.stats.backlog_tickets_suppressed));
    print_stat("Epic records", stats.epic_records);
    print_stat("Teams", layout.stats.teams);
    print_stat("Sprint columns", layout.stats.sprint_columns);
    print_stat("Epics rolled over", layout.stats.epics_rolled_over);
    print_stat("Placements", format!("{} in {} batches", layout.stats.placements, batches));
    if stats.records_skipped_untitled > 0 || ingest.malformed_rows > 0 {
        print_stat(
            "Skipped rows",
            format!("{} untitled, {} malformed", stats.records_skipped_untitled, ingest.malformed_rows),
        );
    }
    print_stat("Processing time", format!("{:.2}s", started.elapsed().as_secs_f64()));
    println!();
    println!("Output files:");
    for out in &output_files {
        println!("  {out}");
    }
    Ok(())
}
