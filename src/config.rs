// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Resolver configuration loaded from a JSON file

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_BACKUP_DNS_SERVERS, DNS_PORT, DNS_TIMEOUT_SECS, HTTP_TIMEOUT_SECS,
    ROOT_TRUST_ANCHOR, TLS_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Settings for DNS fail-over, timeouts and payment URI schemes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletNsConfig {
    /// Servers tried in order after the system resolver fails
    pub backup_dns_servers: Vec<IpAddr>,
    pub dns_port: u16,
    /// Root DS record in presentation format
    pub trust_anchor: String,
    pub dns_timeout_secs: u64,
    pub tls_timeout_secs: u64,
    pub http_timeout_secs: u64,
    /// Currency code to payment URI scheme
    pub currency_schemes: BTreeMap<String, String>,
    /// Add roots accepted through TLSA to the shared trust store
    pub remember_accepted_roots: bool,
}

impl Default for WalletNsConfig {
    fn default() -> Self {
        let backup_dns_servers = DEFAULT_BACKUP_DNS_SERVERS
            .iter()
            .filter_map(|s| s.parse::<Ipv4Addr>().ok())
            .map(IpAddr::V4)
            .collect();

        Self {
            backup_dns_servers,
            dns_port: DNS_PORT,
            trust_anchor: ROOT_TRUST_ANCHOR.to_string(),
            dns_timeout_secs: DNS_TIMEOUT_SECS,
            tls_timeout_secs: TLS_TIMEOUT_SECS,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            currency_schemes: default_currency_schemes(),
            remember_accepted_roots: false,
        }
    }
}

impl WalletNsConfig {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    tracing::debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Path of the config file in the platform config directory
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("", "", "walletns").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn default_currency_schemes() -> BTreeMap<String, String> {
    [
        ("btc", "bitcoin"),
        ("tbtc", "bitcoin"),
        ("bch", "bitcoincash"),
        ("ltc", "litecoin"),
        ("dgc", "dogecoin"),
        ("doge", "dogecoin"),
        ("nmc", "namecoin"),
        ("dash", "dash"),
        ("mona", "monacoin"),
    ]
    .into_iter()
    .map(|(code, scheme)| (code.to_string(), scheme.to_string()))
    .collect()
}
