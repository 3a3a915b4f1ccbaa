//! Command-line interface for sprint-board
//!
//! Provides `layout`, `reconcile`, `sprints`, `info` and `completions`
//! subcommands.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod info;
mod layout;
mod reconcile;
mod sprints;
mod utils;

/// Lay out tracker exports as team/sprint planning boards
#[derive(Parser)]
#[command(name = "sprint-board")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a tracker CSV and write placement instructions
    Layout(Box<layout::LayoutArgs>),

    /// Reclassify a placed board and emit duplicate mutations
    Reconcile(reconcile::ReconcileArgs),

    /// List upcoming sprint keys with their date ranges
    Sprints(sprints::SprintsArgs),

    /// Display classification statistics without laying out
    Info(info::InfoArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Layout(args) => layout::run(*args),
        Commands::Reconcile(args) => reconcile::run(args),
        Commands::Sprints(args) => sprints::run(args),
        Commands::Info(args) => info::run(args),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "sprint-board", &mut std::io::stdout());
            Ok(())
        }
    }
}
