// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! DNSSEC-authenticated record lookups with backup server fail-over

pub mod handle;
pub mod resolver;
pub mod transport;
pub mod trust_anchor;

pub use resolver::{DnssecLookup, DnssecResolver};
pub use transport::{DnsTransport, UdpTransport};
pub use trust_anchor::TrustAnchor;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnssecError {
    /// The DNSSEC trust anchor could not be loaded
    #[error("Trust anchor error: {0}")]
    TrustAnchor(String),

    /// Authenticated response without a record of the requested type
    #[error("No Query Answer Received")]
    NoAnswer,

    /// The validating resolver reported why validation failed
    #[error("{0}")]
    ValidationFailed(String),

    #[error("Unknown DNSSEC Lookup Failure")]
    UnknownFailure,

    /// Transport-level failure talking to the selected server
    #[error("DNSSEC Lookup Failure: {0}")]
    LookupFailure(String),

    #[error("No DNS servers available")]
    NoServers,

    /// The name cannot be encoded as a DNS query
    #[error("Invalid DNS name {0}")]
    InvalidName(String),
}

impl DnssecError {
    /// Whether trying the same query on a backup server may help
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DnssecError::ValidationFailed(_)
                | DnssecError::UnknownFailure
                | DnssecError::LookupFailure(_)
        )
    }
}
