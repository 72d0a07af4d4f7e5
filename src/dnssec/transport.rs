// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Wire transport for DNSSEC queries

use hickory_proto::op::Message;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

/// Sends DNSSEC queries to a single server
#[async_trait::async_trait]
pub trait DnsTransport: Send + Sync {
    /// Send `query` to `server` and return its response
    async fn exchange(&self, server: SocketAddr, query: &Message) -> io::Result<Message>;
}

/// UDP exchange with TCP fallback for truncated answers. Responses are
/// returned as received; proving them is up to the caller.
pub struct UdpTransport {
    timeout: Duration,
}

impl UdpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn exchange_udp(&self, server: SocketAddr, query: &[u8], id: u16) -> io::Result<Message> {
        let bind_addr = if server.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(server).await?;
        socket.send(query).await?;

        let mut buf = vec![0u8; 65535];
        loop {
            let len = socket.recv(&mut buf).await?;
            let response = Message::from_vec(&buf[..len]).map_err(invalid_data)?;
            // Stray datagrams for other queries are dropped
            if response.id() == id {
                return Ok(response);
            }
            tracing::debug!("Ignoring DNS response with mismatched id {}", response.id());
        }
    }

    async fn exchange_tcp(&self, server: SocketAddr, query: &[u8]) -> io::Result<Message> {
        let len = u16::try_from(query.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "DNS query too large"))?;

        let mut stream = TcpStream::connect(server).await?;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(query).await?;

        let response_len = stream.read_u16().await?;
        let mut buf = vec![0u8; usize::from(response_len)];
        stream.read_exact(&mut buf).await?;

        Message::from_vec(&buf).map_err(invalid_data)
    }
}

#[async_trait::async_trait]
impl DnsTransport for UdpTransport {
    async fn exchange(&self, server: SocketAddr, query: &Message) -> io::Result<Message> {
        let bytes = query.to_vec().map_err(invalid_data)?;

        let attempt = async {
            let response = self.exchange_udp(server, &bytes, query.id()).await?;
            if response.truncated() {
                tracing::debug!("Truncated UDP response from {}, retrying over TCP", server);
                self.exchange_tcp(server, &bytes).await
            } else {
                Ok(response)
            }
        };

        tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, format!("{} timed out", server)))?
    }
}

fn invalid_data(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}
