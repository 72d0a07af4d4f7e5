// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Address checks per currency code
//!
//! Bitcoin addresses go through the `bitcoin` crate and must belong to the
//! currency's network. Other coins reuse Base58Check and segwit bech32 with
//! their own version bytes and human readable parts.

use bitcoin::{base58, bech32, Address, Network};
use std::str::FromStr;

/// Base58Check payload: one version byte and a 20 byte hash
const HASH_PAYLOAD_LEN: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRules {
    Bitcoin(Network),

    /// Base58Check with one of `versions`, or segwit under `hrp`
    Coin {
        versions: &'static [u8],
        hrp: Option<&'static str>,
    },

    /// Unlisted currency: any Base58Check or segwit string
    ChecksumOnly,
}

impl AddressRules {
    pub fn for_currency(currency: &str) -> Self {
        match currency.to_lowercase().as_str() {
            "btc" => AddressRules::Bitcoin(Network::Bitcoin),
            "tbtc" => AddressRules::Bitcoin(Network::Testnet),
            // Legacy encoding only, CashAddr strings are not accepted
            "bch" => AddressRules::Coin {
                versions: &[0x00, 0x05],
                hrp: None,
            },
            "ltc" => AddressRules::Coin {
                versions: &[0x30, 0x32, 0x05],
                hrp: Some("ltc"),
            },
            "doge" | "dgc" => AddressRules::Coin {
                versions: &[0x1e, 0x16],
                hrp: None,
            },
            "nmc" => AddressRules::Coin {
                versions: &[0x34, 0x0d],
                hrp: None,
            },
            "dash" => AddressRules::Coin {
                versions: &[0x4c, 0x10],
                hrp: None,
            },
            "mona" => AddressRules::Coin {
                versions: &[0x32, 0x37, 0x05],
                hrp: Some("mona"),
            },
            _ => AddressRules::ChecksumOnly,
        }
    }

    pub fn accepts(&self, address: &str) -> bool {
        match self {
            AddressRules::Bitcoin(network) => Address::from_str(address)
                .map(|address| address.require_network(*network).is_ok())
                .unwrap_or(false),
            AddressRules::Coin { versions, hrp } => {
                base58_version(address).is_some_and(|version| versions.contains(&version))
                    || hrp.is_some_and(|hrp| segwit_hrp(address).as_deref() == Some(hrp))
            }
            AddressRules::ChecksumOnly => {
                base58::decode_check(address).is_ok_and(|payload| !payload.is_empty())
                    || segwit_hrp(address).is_some()
            }
        }
    }
}

/// Version byte of a Base58Check hash address
fn base58_version(address: &str) -> Option<u8> {
    let payload = base58::decode_check(address).ok()?;
    (payload.len() == HASH_PAYLOAD_LEN).then(|| payload[0])
}

/// Lowercased human readable part of a valid segwit address
fn segwit_hrp(address: &str) -> Option<String> {
    bech32::segwit::decode(address)
        .ok()
        .map(|(hrp, _, _)| hrp.to_lowercase())
}
