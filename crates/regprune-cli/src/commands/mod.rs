//! CLI commands and argument parsing.

pub mod check;
pub mod clean;

use clap::{Parser, Subcommand};

/// regprune - keep the last N numeric tags of each registry repository
#[derive(Parser)]
#[command(name = "regprune")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Delete tags outside each repository's retention window
    Clean(clean::CleanArgs),

    /// Validate a retention configuration file
    Check(check::CheckArgs),

    /// Print version information
    Version,
}
