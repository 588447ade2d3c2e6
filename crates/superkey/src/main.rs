use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use superkey::commands;
use superkey_aws::{AmazonProvider, AwsResourceClient};
use superkey_config::WorkerConfig;
use superkey_core::ProviderRegistry;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "superkey")]
#[command(
    about = "Forge per-application cloud resources, and tear them down again",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the resources described by a request
    Forge {
        /// Request JSON file ("-" reads stdin)
        #[arg(short, long)]
        request: PathBuf,
        /// Write the ledger to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Leave partially created resources in place when a step fails
        #[arg(long)]
        no_rollback: bool,
    },
    /// Destroy the resources recorded in a ledger
    Teardown {
        /// Ledger JSON file written by `forge` ("-" reads stdin)
        #[arg(short, long)]
        ledger: PathBuf,
        /// Write what could not be destroyed to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show version
    Version,
}

/// Register every provider the worker knows about
async fn build_registry(config: &WorkerConfig) -> ProviderRegistry {
    let client = AwsResourceClient::new(&config.region).await;

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(AmazonProvider::new(
        client,
        config.provider_settings(),
    )));
    registry
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the ledger JSON, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Version needs no config file
    if matches!(cli.command, Commands::Version) {
        println!("superkey {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = superkey_config::load()?;
    tracing::debug!(?config, "Worker config loaded");
    let registry = build_registry(&config).await;

    match cli.command {
        Commands::Forge {
            request,
            output,
            no_rollback,
        } => commands::forge::handle(&registry, &request, output.as_deref(), !no_rollback).await,
        Commands::Teardown { ledger, output } => {
            commands::teardown::handle(&registry, &ledger, output.as_deref()).await
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }
}
