//! gh-secrets-migrator - move GitHub Actions secrets between repositories and organizations

use clap::Parser;
use colored::Colorize;
use log::LevelFilter;

mod cli;
mod client;
mod clock;
mod config;
mod error;
mod inventory;
mod migrator;
mod output;
mod workflow;

use cli::Cli;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    cli::migrate::run(&cli).await
}

/// Info by default, debug for this crate with `--verbose`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module(env!("CARGO_CRATE_NAME"), level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}
