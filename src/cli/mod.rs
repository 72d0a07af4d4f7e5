// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! CLI command implementations

pub mod lookup;
pub mod servers;
pub mod tlsa;

use anyhow::{Context, Result};
use walletns::dns::SystemBootstrap;
use walletns::{WalletNameResolver, WalletNsConfig};

/// Resolver wired to the host DNS configuration
pub fn build_resolver(config: &WalletNsConfig) -> Result<WalletNameResolver> {
    WalletNameResolver::from_config(config, &SystemBootstrap).context("Failed to initialize resolver")
}
