use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "healthprobe")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "One-shot health diagnostics with an explainable verdict", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every probe and print the health report
    Run {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Show probe ids and observation times
        #[arg(short, long, default_value = "false")]
        verbose: bool,

        /// Run probes concurrently, one worker per probe
        #[arg(long)]
        parallel: bool,

        /// Per-probe time budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Exit with 0 / 1 / 2 for GOOD / WARNING / CRITICAL
        #[arg(long)]
        exit_code: bool,
    },

    /// List registered probes in execution order
    Probes {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
