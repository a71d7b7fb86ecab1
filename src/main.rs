//! sweepctl - W&B Sweep Controller with Kubernetes Agent Fan-out
//!
//! Main entry point for the sweepctl CLI.

use clap::Parser;
use std::process;
use sweepctl::config::SweepCtlConfig;
use sweepctl::deploy;

/// Create a W&B sweep and deploy its agents onto the cluster
#[derive(Parser, Debug)]
#[command(name = "sweepctl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/sweepctl/config.yaml)
    #[arg(short, long)]
    config: Option<String>,

    /// Deployment tokens: `--job` or `--jobs` deploys job-kind agents
    /// (default: pods); a bare non-negative integer overrides the agent
    /// count, last one wins. Other tokens are ignored.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn main() {
    // Initialize logging
    if let Err(e) = sweepctl::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> sweepctl::Result<()> {
    let config = match cli.config {
        Some(path) => SweepCtlConfig::load(path)?,
        None => SweepCtlConfig::load_default()?,
    };

    let (mode, agents) = deploy::parse_tokens(&cli.tokens);
    let agents = agents.unwrap_or(config.default_agents);

    tracing::info!(mode = %mode, agents, "Starting deploy");

    sweepctl::commands::deploy(&config, mode, agents)
}
