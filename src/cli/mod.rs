//! CLI interface for oi-screener
//!
//! Provides subcommands for:
//! - `run`: Start the screener
//! - `config`: Show the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "oi-screener")]
#[command(about = "Open interest spike screener for derivatives exchanges")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the screener
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}
