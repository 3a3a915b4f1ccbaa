//! Shared CLI utilities.

use anyhow::Result;
use clap::Args;
use console::style;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::config::{resolve_settings, CliOverrides, Settings};
use crate::domain::SprintResolution;

/// Options shared by commands that classify records.
#[derive(Args, Debug, Clone)]
pub struct BoardOptions {
    /// Path to config file (sprint-board.toml or .sprint-board.yaml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Which sprint wins when a record lists several: first or latest
    #[arg(short = 's', long, value_name = "MODE")]
    pub sprint_resolution: Option<SprintResolution>,

    /// Maximum cards per column before an epic rolls over
    #[arg(long, value_name = "N")]
    pub max_cards: Option<usize>,
}

impl BoardOptions {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            sprint_resolution: self.sprint_resolution,
            max_cards_per_column: self.max_cards,
            ..Default::default()
        }
    }
}

/// Resolve settings with the working directory as the config search root.
pub fn settings(config: Option<&Path>, overrides: &CliOverrides) -> Result<Settings> {
    let root = std::env::current_dir()?;
    resolve_settings(&root, config, overrides)
}

pub fn show_progress(disabled: bool) -> bool {
    !disabled && std::io::stderr().is_terminal()
}

pub fn print_heading(text: &str) {
    println!();
    println!("{}", style(text).bold());
    println!();
}

pub fn print_stat(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", format!("{label}:"), value);
}
