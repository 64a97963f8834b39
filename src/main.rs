use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};

use teamfeed::config::FeedConfig;
use teamfeed::pipeline::{self, RunOutcome};

#[derive(Parser)]
#[command(name = "teamfeed")]
#[command(about = "Maintain a filtered, timezone-normalized copy of an upstream ICS feed")]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch unconditionally, ignoring stored validators
    #[arg(long)]
    force: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Exit code for any fatal error; 0 covers success and "no update needed".
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if TermLogger::init(
        level,
        LogConfig::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .is_err()
    {
        eprintln!("Failed to initialize logging");
    }

    match try_main(&cli).await {
        Ok(RunOutcome::Unchanged) | Ok(RunOutcome::Published { .. }) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Fatal error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn try_main(cli: &Cli) -> Result<RunOutcome> {
    let config =
        FeedConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    Ok(pipeline::run(&config, cli.force).await?)
}
