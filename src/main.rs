// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! WalletNS CLI application

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use walletns::WalletNsConfig;

mod cli;

#[derive(Parser)]
#[command(name = "walletns")]
#[command(about = "Resolve DNSSEC wallet names to cryptocurrency payment URIs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a wallet name to a payment URI
    Resolve {
        /// Wallet name (e.g., wallet.example.com or user@example.com)
        label: String,
        /// Currency code (e.g., btc)
        currency: String,
        /// Require TLSA validation of redirect endpoints
        #[arg(long)]
        validate_tlsa: bool,
    },
    /// List the currencies a wallet name publishes
    Currencies {
        /// Wallet name
        label: String,
    },
    /// Check an HTTPS endpoint against its TLSA record
    Tlsa {
        /// Endpoint URL (e.g., https://example.com/)
        url: String,
    },
    /// Show the DNS servers used for lookups
    Servers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Without -v: only WARN and ERROR from walletns
    // With -v: INFO and above from walletns
    // With RUST_LOG set: whatever it selects
    if std::env::var("RUST_LOG").is_err() {
        use tracing_subscriber::EnvFilter;

        let filter = if cli.verbose {
            EnvFilter::new("walletns=info")
        } else {
            EnvFilter::new("walletns=warn")
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_target(true)
            .init();
    }

    let config = WalletNsConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Resolve {
            label,
            currency,
            validate_tlsa,
        } => {
            cli::lookup::resolve_command(&config, label, currency, validate_tlsa).await?;
        }
        Commands::Currencies { label } => {
            cli::lookup::currencies_command(&config, label).await?;
        }
        Commands::Tlsa { url } => {
            cli::tlsa::tlsa_command(&config, url).await?;
        }
        Commands::Servers => {
            cli::servers::servers_command(&config).await?;
        }
    }

    Ok(())
}
