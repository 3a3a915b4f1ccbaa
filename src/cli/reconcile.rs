//! Reconcile command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::{print_heading, print_stat};
use crate::config::{load_config, overlay_env};
use crate::ingest::read_snapshot_from_path;
use crate::reconcile::reconcile;
use crate::render::{write_export_csv, write_reconcile_report};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Geometry snapshot (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "out")]
    pub output_dir: PathBuf,

    /// Path to config file (sprint-board.toml or .sprint-board.yaml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write export.csv with each work item's team and sprint
    #[arg(long)]
    pub export_csv: bool,

    /// Omit generated_at from reconcile.json
    #[arg(long)]
    pub no_timestamp: bool,
}

pub fn run(args: ReconcileArgs) -> Result<()> {
    // Only boundary tuning matters here, so the sprint resolution mode is
    // not required.
    let root = std::env::current_dir()?;
    let layered = overlay_env(load_config(&root, args.config.as_deref())?)?;
    let tuning = layered.boundary.unwrap_or_default();
    tuning.validate()?;

    let snapshot = read_snapshot_from_path(&args.snapshot)?;
    let outcome = reconcile(&snapshot, &tuning);

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("Failed to create output directory {}", args.output_dir.display())
    })?;
    let report_path = args.output_dir.join("reconcile.json");
    write_reconcile_report(&report_path, &outcome, !args.no_timestamp)?;
    let mut output_files = vec![report_path.display().to_string()];

    if args.export_csv {
        let export_path = args.output_dir.join("export.csv");
        let rows = write_export_csv(&export_path, &outcome)?;
        tracing::debug!("Exported {} work items", rows);
        output_files.push(export_path.display().to_string());
    }

    let stats = &outcome.stats;
    print_heading("Reconcile complete!");
    print_stat("Elements", stats.elements);
    print_stat("Team bands", stats.team_bands);
    print_stat("Sprint boundaries", stats.sprint_boundaries);
    if stats.boundaries_ambiguous > 0 {
        print_stat("Ambiguous boundaries", stats.boundaries_ambiguous);
    }
    print_stat("Unclassified", stats.unclassified);
    print_stat("Duplicate groups", stats.duplicate_groups);
    print_stat("Mutations", stats.mutations);
    println!();
    println!("Output files:");
    for out in &output_files {
        println!("  {out}");
    }
    Ok(())
}
