// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Cryptocurrency payment URIs (BIP21 with the BIP72 `r` parameter)
//!
//! A payment URI has the form `scheme:address?param=value&...`. The address
//! may be omitted when a payment request URL (`r`) is given. Parameters
//! prefixed with `req-` must be understood by the wallet, so any such
//! parameter not known here makes the URI invalid.

pub mod address;

pub use address::AddressRules;

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentUriError {
    #[error("Missing URI scheme in {0:?}")]
    MissingScheme(String),

    #[error("Unsupported URI scheme {0:?}")]
    UnknownScheme(String),

    #[error("URI scheme {found:?} does not match the currency's {expected:?}")]
    SchemeMismatch { expected: String, found: String },

    #[error("Invalid address {0:?}")]
    InvalidAddress(String),

    #[error("Invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("Unsupported required parameter {0:?}")]
    UnsupportedRequiredParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUri {
    pub scheme: String,
    pub address: Option<String>,
    /// Query parameters in their original order
    pub params: Vec<(String, String)>,
}

impl PaymentUri {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn amount(&self) -> Option<&str> {
        self.param("amount")
    }

    pub fn label(&self) -> Option<&str> {
        self.param("label")
    }

    pub fn message(&self) -> Option<&str> {
        self.param("message")
    }

    /// BIP72 payment request URL
    pub fn payment_request_url(&self) -> Option<&str> {
        self.param("r")
    }
}

impl fmt::Display for PaymentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.address.as_deref().unwrap_or(""))?;
        if !self.params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter())
                .finish();
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}

/// Parses payment URIs and maps currency codes to URI schemes
pub trait PaymentUriParser: Send + Sync {
    /// Parse `text` as a payment URI for `currency`
    fn parse(&self, currency: &str, text: &str) -> Result<PaymentUri, PaymentUriError>;

    /// URI scheme used for `currency`, e.g. `bitcoin` for `btc`
    fn scheme_for(&self, currency: &str) -> Option<String>;
}

/// Parser accepting the schemes of a currency code table
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    schemes: BTreeMap<String, String>,
}

impl SchemeRegistry {
    pub fn new(schemes: BTreeMap<String, String>) -> Self {
        let schemes = schemes
            .into_iter()
            .map(|(code, scheme)| (code.to_lowercase(), scheme.to_lowercase()))
            .collect();
        Self { schemes }
    }

    fn is_known_scheme(&self, scheme: &str) -> bool {
        self.schemes.values().any(|known| known == scheme)
    }
}

impl PaymentUriParser for SchemeRegistry {
    fn parse(&self, currency: &str, text: &str) -> Result<PaymentUri, PaymentUriError> {
        let text = text.trim();
        let (scheme, rest) = text
            .split_once(':')
            .ok_or_else(|| PaymentUriError::MissingScheme(text.to_string()))?;

        let scheme = scheme.to_lowercase();
        if !self.is_known_scheme(&scheme) {
            return Err(PaymentUriError::UnknownScheme(scheme));
        }
        if let Some(expected) = self.scheme_for(currency) {
            if expected != scheme {
                return Err(PaymentUriError::SchemeMismatch {
                    expected,
                    found: scheme,
                });
            }
        }

        // Tolerate the `scheme://address` form some publishers use
        let rest = rest.trim_start_matches("//");
        let (address, query) = match rest.split_once('?') {
            Some((address, query)) => (address, query),
            None => (rest, ""),
        };

        let params: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        for (key, value) in &params {
            match key.as_str() {
                "amount" => {
                    if !is_decimal(value) {
                        return Err(PaymentUriError::InvalidAmount(value.clone()));
                    }
                }
                "label" | "message" | "r" => {}
                required if required.starts_with("req-") => {
                    return Err(PaymentUriError::UnsupportedRequiredParam(required.to_string()));
                }
                _ => {}
            }
        }

        let has_request = params.iter().any(|(key, _)| key == "r");
        let address = if address.is_empty() {
            if !has_request {
                return Err(PaymentUriError::InvalidAddress(String::new()));
            }
            None
        } else if AddressRules::for_currency(currency).accepts(address) {
            Some(address.to_string())
        } else {
            return Err(PaymentUriError::InvalidAddress(address.to_string()));
        };

        Ok(PaymentUri {
            scheme,
            address,
            params,
        })
    }

    fn scheme_for(&self, currency: &str) -> Option<String> {
        self.schemes.get(&currency.to_lowercase()).cloned()
    }
}

fn is_decimal(value: &str) -> bool {
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    !value.is_empty()
        && value != "."
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit())
}
