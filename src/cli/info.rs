//! Info command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::{print_heading, print_stat, settings, BoardOptions};
use crate::context::BoardContext;
use crate::ingest::read_records_from_path;

#[derive(Args)]
pub struct InfoArgs {
    /// Tracker CSV export
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub board: BoardOptions,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let settings = settings(args.board.config.as_deref(), &args.board.overrides())?;
    let ctx = BoardContext::new(settings.board)?;

    let ingest = read_records_from_path(&args.input)?;
    let outcome = ctx.classify(&ingest.records);
    let groupings = ctx.group(&outcome);
    let stats = &outcome.stats;

    print_heading("Records");
    print_stat("Sprint resolution", ctx.config().sprint_resolution);
    print_stat("Records", stats.records_total);
    print_stat("Tickets", stats.tickets_classified);
    print_stat("Epic records", stats.epic_records);
    print_stat("Skipped (untitled)", stats.records_skipped_untitled);
    print_stat("Malformed rows", ingest.malformed_rows);
    print_stat("Sprint unresolved", stats.sprint_unresolved);
    print_stat("Backlog (no sprint)", stats.sprint_backlog);
    print_stat("Team unknown", stats.team_defaulted);
    print_stat("Numeric team ignored", stats.team_numeric_ignored);

    if !groupings.is_empty() {
        print_heading("Teams");
        for grouping in &groupings {
            let tickets = stats.tickets_per_team.get(&grouping.team_name).copied().unwrap_or(0);
            let sprints: Vec<String> =
                grouping.columns.iter().map(|c| c.sprint_key.to_string()).collect();
            println!("  {} ({} tickets): {}", grouping.team_name, tickets, sprints.join(", "));
        }
    }
    Ok(())
}
