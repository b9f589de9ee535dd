//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pump", version, about = "Pump operating-point monitor")]
pub struct Cli {
    /// Path to config TOML (typed); built-in reference data when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Envelope table CSV (strict header: head_band,min_flow,max_flow)
    #[arg(long = "envelope-csv", value_name = "FILE")]
    pub envelope_csv: Option<PathBuf>,

    /// Rated curve CSV (strict header: head,flow)
    #[arg(long = "curve-csv", value_name = "FILE")]
    pub curve_csv: Option<PathBuf>,

    /// Output JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a monitoring session and print every published reading
    Watch {
        /// Stop after this many published readings
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Override sampler.interval_ms
        #[arg(long = "interval-ms", value_name = "MS")]
        interval_ms: Option<u64>,
        /// Override source.seed for reproducible fixture draws
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        /// Read `field value` lines from stdin as manual overrides
        #[arg(long, action = ArgAction::SetTrue)]
        interactive: bool,
    },
    /// Classify one operating point against the envelope table
    Classify {
        #[arg(long, value_name = "M", allow_hyphen_values = true)]
        head: String,
        #[arg(long, value_name = "M3H", allow_hyphen_values = true)]
        flow: String,
    },
    /// Print the chart series as JSON
    Render {
        /// Highlight this head instead of the first sampled point
        #[arg(long, value_name = "M", requires = "flow", allow_hyphen_values = true)]
        head: Option<String>,
        #[arg(long, value_name = "M3H", requires = "head", allow_hyphen_values = true)]
        flow: Option<String>,
    },
    /// Validate configuration and print a summary
    SelfCheck,
}
