//! # itemforge CLI
//!
//! The `itemforge` binary drives the build-aggregation pipeline from the
//! command line.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `itemforge import` | Fetch builds from the selected sources and write item sets |
//! | `itemforge delete` | Delete previously generated item-set files |
//! | `itemforge version` | Print the game-data version and each source's own version |
//! | `itemforge sources` | List registered source adapters |
//!
//! All commands accept a `--config` flag pointing to a TOML settings file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use itemforge::aggregator::Aggregator;
use itemforge::config;
use itemforge::progress::ProgressMode;
use itemforge::translate::Translator;

/// itemforge — champion build aggregation for the game client.
#[derive(Parser)]
#[command(
    name = "itemforge",
    about = "Aggregates champion item builds from community stats sites into game-client item sets",
    version
)]
struct Cli {
    /// Path to the settings file (TOML).
    #[arg(long, global = true, default_value = "./itemforge.toml")]
    config: PathBuf,

    /// Disable progress output.
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full import: resolve metadata, fetch builds from every
    /// selected source, and write item sets under the install root.
    Import {
        /// Marks a run re-launched with elevated privileges.
        #[arg(long, hide = true)]
        elevated: bool,
    },

    /// Delete previously generated item-set files.
    Delete,

    /// Print the resolved game-data version and each source's own
    /// advertised version (best-effort).
    Version,

    /// List registered source adapters.
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = config::load_settings(&cli.config)
        .with_context(|| format!("could not load settings from {}", cli.config.display()))?;

    let progress_mode = if cli.quiet {
        ProgressMode::Off
    } else {
        ProgressMode::default_for_tty()
    };
    let aggregator = Aggregator::new(settings.clone(), cli.config.clone(), progress_mode);

    match cli.command {
        Commands::Import { elevated } => {
            if !aggregator.verify_settings() {
                anyhow::bail!(
                    "at least one Summoner's Rift source must be selected (options.sr_source)"
                );
            }

            let report = aggregator.run(elevated).await?;
            if report.elevated {
                println!("import restarted with elevated privileges");
                return Ok(());
            }

            println!("import {}", report.version);
            for (source, version) in &report.source_versions {
                println!("  {}: {}", source, version);
            }
            println!("  item sets written: {}", report.written);
            if report.failures.is_empty() {
                let t = Translator::new(&settings.options.locale);
                println!("  {}", t.t("all_builds_available"));
            } else {
                println!("  builds unavailable:");
                for failure in &report.failures {
                    println!(
                        "    {}: {} ({})",
                        failure.source, failure.champion, failure.position
                    );
                }
            }
            println!("ok");
        }

        Commands::Delete => {
            aggregator.delete_old_builds(true)?;
            println!("deleted generated item sets under {}", settings.install.itemset_path.display());
        }

        Commands::Version => {
            let version = aggregator.get_version().await?;
            println!("game data: {}", version);
            for adapter in aggregator.registry().adapters() {
                let source_version = adapter.get_version(aggregator.scheduler()).await;
                println!("{}: {}", adapter.name(), source_version);
            }
        }

        Commands::Sources => {
            for adapter in aggregator.registry().adapters() {
                let aram = if adapter.supports_aram() { " (aram)" } else { "" };
                println!("{} — {}{}", adapter.id(), adapter.name(), aram);
            }
        }
    }

    Ok(())
}
