mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use healthprobe::check::{self, output};
use healthprobe::config::{Config, Execution};
use healthprobe::telemetry;
use std::io::Write;
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json, cli.log_level);

    let result = match cli.command {
        Commands::Run { config, output, verbose, parallel, timeout_ms, exit_code } => {
            run(config.as_deref(), &output, verbose, parallel, timeout_ms, exit_code)
        }
        Commands::Probes { config } => list_probes(config.as_deref()),
        Commands::Config { config } => print_config(config.as_deref()),
    };

    let _ = std::io::stdout().flush();
    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(3);
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| match path {
        Some(p) => format!("loading config {}", p.display()),
        None => "building default config".to_string(),
    })
}

fn run(
    config_path: Option<&Path>,
    format: &str,
    verbose: bool,
    parallel: bool,
    timeout_ms: Option<u64>,
    exit_code: bool,
) -> anyhow::Result<i32> {
    let mut config = load_config(config_path)?;
    if parallel {
        config.engine.execution = Execution::Parallel;
    }
    if timeout_ms.is_some() {
        config.engine.probe_timeout_ms = timeout_ms;
    }
    config.validate().context("validating command line overrides")?;

    let report = check::run_check(&config);
    output::display(&report, format, verbose).context("rendering report")?;

    Ok(if exit_code { report.overall.exit_code() } else { 0 })
}

fn list_probes(config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = load_config(config_path)?;
    for (i, probe) in check::probes::registry(&config).iter().enumerate() {
        println!("{:>2}. {:<18} {}", i + 1, probe.id(), probe.name());
    }
    Ok(0)
}

fn print_config(config_path: Option<&Path>) -> anyhow::Result<i32> {
    let config = load_config(config_path)?;
    print!("{}", config.to_toml()?);
    Ok(0)
}
