// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Wallet name lookup commands

use anyhow::{Context, Result};
use walletns::{WalletNameError, WalletNsConfig};

pub async fn resolve_command(
    config: &WalletNsConfig,
    label: String,
    currency: String,
    validate_tlsa: bool,
) -> Result<()> {
    println!("Resolving {} for {}\n", currency, label);

    let resolver = super::build_resolver(config)?;

    match resolver.resolve(&label, &currency, validate_tlsa).await {
        Ok(uri) => {
            println!("✓ {}", uri);
            if let Some(address) = &uri.address {
                println!("  Address: {}", address);
            }
            if let Some(amount) = uri.amount() {
                println!("  Amount: {}", amount);
            }
            if let Some(request) = uri.payment_request_url() {
                println!("  Payment request: {}", request);
            }
            Ok(())
        }
        Err(WalletNameError::CurrencyUnavailable) => {
            println!("✗ {} does not publish a {} address", label, currency);
            println!("\nUse 'walletns currencies {}' to list what it publishes.", label);
            Ok(())
        }
        Err(e) => Err(e).context("Wallet name resolution failed"),
    }
}

pub async fn currencies_command(config: &WalletNsConfig, label: String) -> Result<()> {
    println!("Looking up currencies for {}\n", label);

    let resolver = super::build_resolver(config)?;

    match resolver.get_available_currencies(&label).await {
        Ok(currencies) => {
            println!("Currencies for '{}':", label);
            for currency in currencies {
                println!("  {}", currency);
            }
            Ok(())
        }
        Err(WalletNameError::DoesNotExist) => {
            println!("✗ {} is not a wallet name", label);
            Ok(())
        }
        Err(e) => Err(e).context("Currency lookup failed"),
    }
}
