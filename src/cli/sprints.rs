//! Sprints command implementation

use anyhow::Result;
use clap::Args;

use crate::classify::sprint::{fallback_date_range, future_sprints};
use crate::domain::config::{DEFAULT_NUM_FUTURE_SPRINTS, DEFAULT_SPRINT_LENGTH_DAYS};
use crate::domain::SprintKey;

#[derive(Args)]
pub struct SprintsArgs {
    /// Current sprint key (e.g. 2025-24)
    #[arg(short, long, value_name = "KEY")]
    pub from: SprintKey,

    /// Number of upcoming sprints to list
    #[arg(short = 'n', long, value_name = "N", default_value_t = DEFAULT_NUM_FUTURE_SPRINTS)]
    pub count: usize,

    /// Sprint length used for the date ranges
    #[arg(long, value_name = "DAYS", default_value_t = DEFAULT_SPRINT_LENGTH_DAYS)]
    pub sprint_length_days: u32,
}

pub fn run(args: SprintsArgs) -> Result<()> {
    if args.from.is_backlog() {
        anyhow::bail!("--from must be a sprint key such as 2025-24, not Backlog");
    }
    for key in future_sprints(args.from, args.count) {
        match fallback_date_range(key, args.sprint_length_days) {
            Some(range) => println!("{key}\t{range}"),
            None => println!("{key}"),
        }
    }
    Ok(())
}
