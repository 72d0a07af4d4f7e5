// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! TLSA endpoint check command

use anyhow::{Context, Result};
use url::Url;
use walletns::tlsa::tlsa_query_name;
use walletns::{TlsaVerdict, WalletNsConfig};

pub async fn tlsa_command(config: &WalletNsConfig, url: String) -> Result<()> {
    let url = Url::parse(&url).with_context(|| format!("Invalid URL: {}", url))?;
    let name = tlsa_query_name(&url).context("URL has no TLSA name")?;
    println!("Checking {} against {}\n", url, name);

    let resolver = super::build_resolver(config)?;
    let validator = resolver.tlsa_validator();

    let Some(record) = validator.fetch_tlsa_record(&url).await else {
        println!("No authenticated TLSA record found");
        println!("✗ Certificate chain does not satisfy the TLSA record");
        return Ok(());
    };
    println!(
        "TLSA record: usage {:?}, selector {:?}, matching {:?}",
        record.cert_usage, record.selector, record.matching_type
    );

    let verdict = validator
        .validate_record(&url, &record)
        .await
        .context("TLSA validation failed")?;
    match verdict {
        TlsaVerdict::Valid => println!("✓ Certificate chain satisfies the TLSA record"),
        TlsaVerdict::AcceptRoot(cert) => {
            println!("✓ TLSA record designates a trusted root");
            println!("  Root: {}", cert.subject_name());
        }
        TlsaVerdict::Denied => println!("✗ Certificate chain does not satisfy the TLSA record"),
    }

    Ok(())
}
