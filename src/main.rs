//! sprint-board command-line entry point

use anyhow::Result;

fn main() -> Result<()> {
    sprint_board::cli::run()
}
