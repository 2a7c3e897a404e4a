//! newsreap - concurrent news harvester
//!
//! Pages through the categories of several Russian news sites, fetches every
//! listed article and stores its plain text under the output directory.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "newsreap")]
#[command(about = "Concurrent news harvester")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./newsreap.toml or ~/.config/newsreap/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Connect timeout in seconds
    #[arg(long, global = true)]
    connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds
    #[arg(long, global = true)]
    request_timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest articles from the configured sources
    Harvest(cmd::harvest::HarvestArgs),
    /// Count saved articles per category
    Report(cmd::report::ReportArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(newsreap_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, the status lines show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    newsreap_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Config file defaults, CLI overrides
    newsreap_core::set_http_config(newsreap_core::HttpConfig {
        connect_timeout: Duration::from_secs(
            cli.connect_timeout.unwrap_or(config.http.connect_timeout),
        ),
        request_timeout: Duration::from_secs(
            cli.request_timeout.unwrap_or(config.http.request_timeout),
        ),
        ..Default::default()
    });

    match cli.command {
        Command::Harvest(args) => cmd::harvest::run(args, &config, &progress),
        Command::Report(args) => cmd::report::run(args, &config).map(|()| ExitCode::SUCCESS),
        Command::Config => {
            cmd::print_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}
