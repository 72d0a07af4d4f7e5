// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! WalletNS - Wallet Name resolution
//!
//! Resolves human-readable wallet names to cryptocurrency payment URIs using
//! DNSSEC-authenticated TXT records, with optional TLSA validation of HTTPS
//! endpoints that serve the payment data.

pub mod config;
pub mod constants;
pub mod dns;
pub mod dnssec;
pub mod error;
pub mod payment;
pub mod resolver;
pub mod tlsa;

pub use constants::*;

// Re-export commonly used types
pub use config::WalletNsConfig;
pub use error::{SetupError, WalletNameError};
pub use payment::{PaymentUri, PaymentUriParser, SchemeRegistry};
pub use resolver::{preprocess_wallet_name, DecodedWalletTarget, WalletNameResolver};
pub use tlsa::{TlsaValidator, TlsaVerdict, TrustAnchorStore};

/// Result of a wallet name operation
pub type Result<T> = std::result::Result<T, WalletNameError>;
