//! kkn-checkin - SIMASTER login and geofenced attendance check-in.
//!
//! Main entry point for the `checkin` CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, login, run, sample};

/// Log in to SIMASTER and record KKN attendance from inside the geofence
#[derive(Parser)]
#[command(name = "checkin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the user config.toml
    #[arg(long, global = true, env = "CHECKIN_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory holding checkin.toml and .env (default: current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and submit a check-in
    Run(run::RunArgs),

    /// Log in only and report the result
    Login(login::LoginArgs),

    /// Print sample points from the configured geofence
    Sample(sample::SampleArgs),

    /// Configuration inspection
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "checkin=debug,checkin_oauth=debug,checkin_client=debug,checkin_config=debug,info"
    } else {
        "checkin=info,checkin_oauth=info,checkin_client=info,warn"
    };

    let log_dir = cli
        .config_dir
        .clone()
        .or_else(checkin_config::user_config_dir)
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "checkin.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "checkin=trace,checkin_oauth=trace,checkin_client=trace,checkin_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        config_dir: cli.config_dir,
        project_dir: cli.project_dir,
    };

    match cli.command {
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::Login(args) => login::run(args, &ctx).await,
        Commands::Sample(args) => sample::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
