#![warn(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use settings::Config;

mod daemon;
mod install;
mod monitoring;

use daemon::Daemon;
use monitoring::CheckRunner;
use monitoring::publisher;

#[derive(Parser)]
#[command(name = "pushling", version, about = "Run local checks; push results to Uptime Kuma")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduling daemon (default).
    Run,
    /// Execute every configured check once, publish and exit.
    Once,
    /// Install a starter config file and systemd unit.
    Install {
        #[arg(long, default_value = "/etc/pushling")]
        config_dir: PathBuf,
        #[arg(long, default_value = "/etc/systemd/system")]
        systemd_dir: PathBuf,
        /// Overwrite existing files.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Command::Install { config_dir, systemd_dir, force }) = &cli.command {
        return install::install_files(config_dir, systemd_dir, *force);
    }

    let config = Config::load(cli.config.as_deref())
        .context("configuration rejected, refusing to start")?;
    logger::init_tracing(&config.log.level, &config.log.format);

    match cli.command {
        Some(Command::Once) => run_once(config).await,
        _ => Daemon::new(cli.config, config).run().await,
    }
}

/// One-shot mode: run the pipeline for every check in configuration order.
async fn run_once(config: Config) -> anyhow::Result<()> {
    for check in config.checks {
        let publisher = publisher::for_check(&check.publisher)
            .with_context(|| format!("cannot build publisher for check {}", check.name))?;
        let mut runner = CheckRunner::new(check, publisher);
        runner.run().await;
    }
    Ok(())
}
