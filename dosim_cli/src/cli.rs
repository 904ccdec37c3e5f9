//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "dosim", version, about = "Chemical-dosing fleet telemetry simulator")]
pub struct Cli {
    /// Path to config TOML; environment variables override file values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish simulated telemetry until interrupted
    Run {
        /// RNG seed override for a reproducible run
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Tick period override in seconds
        #[arg(long = "period-s", value_name = "SECS")]
        period_s: Option<f64>,

        /// Stop after this many ticks (default: run until interrupted)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,

        /// Print records to stdout instead of publishing to the broker
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Load and validate the configuration, then print a summary
    CheckConfig,
}
