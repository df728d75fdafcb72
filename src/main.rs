//! Uniload - load prebuilt packages into the running tool
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uniload::cli::{Cli, Commands};
use uniload::config::ConfigManager;
use uniload::error::UniloadResult;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> UniloadResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions(args) = cli.command {
        return uniload::cli::commands::completions(args).await;
    }

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug; config verbose counts as one -v
    let level = cli.verbose + u8::from(config.general.verbose);
    let filter = match level {
        0 => EnvFilter::new("uniload=warn"),
        1 => EnvFilter::new("uniload=info"),
        _ => EnvFilter::new("uniload=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    debug!("Using config at {}", config_manager.path().display());

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Load(args) => uniload::cli::commands::load(args, &config).await,
        Commands::List(args) => uniload::cli::commands::list(args, &config).await,
        Commands::Config(args) => {
            uniload::cli::commands::config(args, &config_manager, &config).await
        }
    }
}
