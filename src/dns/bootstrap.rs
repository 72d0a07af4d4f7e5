// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Discovery of the DNS servers configured on the host

use std::net::{IpAddr, SocketAddr};

/// Source of the initial DNS server list
pub trait DnsBootstrap: Send + Sync {
    /// Configured DNS servers in preference order. Never fails; an empty
    /// list means nothing usable is configured.
    fn system_servers(&self) -> Vec<IpAddr>;
}

/// Reads the operating system resolver configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBootstrap;

impl DnsBootstrap for SystemBootstrap {
    fn system_servers(&self) -> Vec<IpAddr> {
        match hickory_resolver::system_conf::read_system_conf() {
            Ok((config, _opts)) => {
                let servers = unique_server_ips(config.name_servers().iter().map(|ns| ns.socket_addr));
                tracing::debug!("System DNS servers: {:?}", servers);
                servers
            }
            Err(e) => {
                tracing::warn!("Failed to read system DNS configuration: {}", e);
                Vec::new()
            }
        }
    }
}

/// Fixed server list, for hosts without a readable resolver config
#[derive(Debug, Clone, Default)]
pub struct StaticBootstrap(pub Vec<IpAddr>);

impl DnsBootstrap for StaticBootstrap {
    fn system_servers(&self) -> Vec<IpAddr> {
        self.0.clone()
    }
}

/// Collapse name server entries to their addresses, keeping first-seen order.
/// The host config lists every server once per protocol.
fn unique_server_ips(addrs: impl IntoIterator<Item = SocketAddr>) -> Vec<IpAddr> {
    let mut servers: Vec<IpAddr> = Vec::new();
    for addr in addrs {
        let ip = addr.ip();
        if ip.is_unspecified() || servers.contains(&ip) {
            continue;
        }
        servers.push(ip);
    }
    servers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_dns_server() {
        let servers = unique_server_ips([addr("8.8.8.8:53"), addr("8.8.8.8:53")]);
        assert_eq!(servers, vec![IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))]);
    }

    #[test]
    fn test_multiple_dns_servers() {
        let servers = unique_server_ips([
            addr("8.8.8.8:53"),
            addr("8.8.8.8:53"),
            addr("8.8.4.4:53"),
            addr("8.8.4.4:53"),
        ]);
        assert_eq!(
            servers,
            vec![
                IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
                IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4))
            ]
        );
    }

    #[test]
    fn test_no_dns_servers() {
        assert!(unique_server_ips([addr("0.0.0.0:53")]).is_empty());
        assert!(StaticBootstrap::default().system_servers().is_empty());
    }
}
