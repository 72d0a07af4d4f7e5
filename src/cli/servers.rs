// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! DNS server inspection command

use anyhow::{Context, Result};
use std::sync::Arc;
use walletns::dns::{DnsBootstrap, SystemBootstrap};
use walletns::dnssec::{DnssecResolver, TrustAnchor, UdpTransport};
use walletns::WalletNsConfig;

pub async fn servers_command(config: &WalletNsConfig) -> Result<()> {
    let system = SystemBootstrap.system_servers();

    println!("System DNS servers:");
    if system.is_empty() {
        println!("  (none configured)");
    }
    for server in &system {
        println!("  {}", server);
    }

    let resolver = DnssecResolver::new(
        &system,
        &config.backup_dns_servers,
        config.dns_port,
        config.trust_anchor.clone(),
        Arc::new(UdpTransport::new(config.dns_timeout())),
    )
    .context("No usable DNS server")?;

    println!("\nBackup DNS servers:");
    for server in resolver.backup_servers().await {
        println!("  {}", server);
    }

    println!("\nSelected: {}", resolver.selected_server().await);

    let anchor: TrustAnchor = config.trust_anchor.parse().context("Invalid trust anchor")?;
    println!("Trust anchor: key tag {} (algorithm {})", anchor.key_tag, anchor.algorithm);

    Ok(())
}
