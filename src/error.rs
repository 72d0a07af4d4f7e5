// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Error taxonomy surfaced to wallet name callers

use thiserror::Error;

/// Failure of a wallet name resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletNameError {
    /// The wallet name label was empty
    #[error("Wallet Name Label Must Non-Empty")]
    InvalidInput,

    /// No currency list is published for the label
    #[error("No Wallet Name Currency List Present")]
    DoesNotExist,

    /// The label exists but does not publish the requested currency
    #[error("Currency Not Available in Wallet Name")]
    CurrencyUnavailable,

    /// DNSSEC validation or transport failed on every available server
    #[error("{0}")]
    LookupFailure(String),

    /// The redirect endpoint did not satisfy its TLSA policy
    #[error("TLSA Validation Failed: {0}")]
    TlsaValidationFailed(String),

    /// The redirect endpoint could not be fetched
    #[error("WalletName URL Connection Failed: {0}")]
    UrlFetchFailed(String),

    /// The resolved data is not a recognised payment address or URI
    #[error("Invalid payment data: {0}")]
    InvalidPaymentData(String),
}

/// Failure wiring a resolver from configuration
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("DNS setup failed: {0}")]
    Dns(#[from] crate::dnssec::DnssecError),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] crate::tlsa::TlsaError),

    #[error("HTTP setup failed: {0}")]
    Http(#[from] crate::resolver::FetchError),
}
