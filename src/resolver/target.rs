// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Decoding of a currency record into its payment target

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedWalletTarget {
    /// Address or payment URI to parse directly
    DirectAddress(String),
    /// Endpoint serving the payment URI
    RedirectUrl(Url),
}

/// Base64-decode a currency record. An `http`/`https` URL is a redirect;
/// anything else, including values that are not base64, is direct.
pub fn decode(answer: &str) -> DecodedWalletTarget {
    let answer = answer.trim();
    let decoded = match STANDARD.decode(answer).map(String::from_utf8) {
        Ok(Ok(text)) => text,
        _ => return DecodedWalletTarget::DirectAddress(answer.to_string()),
    };

    match Url::parse(decoded.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => DecodedWalletTarget::RedirectUrl(url),
        _ => DecodedWalletTarget::DirectAddress(decoded),
    }
}
