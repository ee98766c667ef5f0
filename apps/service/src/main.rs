mod config;
mod loader;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use checks::ChecksManager;
use clap::Parser;
use logger::LevelFilter;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::config::Config;

/// Synthetic HTTP endpoint monitoring
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of workers, overrides the configuration file
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Print the resolved configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_level(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO });

    let config = Config::from_config(cli.config.as_ref()).context("Failed to load configuration")?;
    if cli.print_config {
        print!("{config}");
        return Ok(());
    }
    debug!("{}", config);

    let threads = cli.threads.unwrap_or(config.manager.threads);
    let mut manager = ChecksManager::new(config.manager.manager_config())
        .context("Failed to create the checks manager")?;
    loader::reload(&mut manager, &config.monitors, threads).await;

    let mut ticker = interval(config.manager.report_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => report::log_report(&manager).await,
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                info!("Shutdown requested");
                break;
            }
        }
    }

    manager.stop(true).await;
    report::log_report(&manager).await;
    info!("All workers stopped");
    Ok(())
}
