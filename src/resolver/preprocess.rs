// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

use sha2::{Digest, Sha224};

/// Hide the mailbox of an email-like wallet name.
///
/// `user@example.com` becomes `<hex sha224("user")>.example.com`; only the
/// first `@` splits. Names without `@` are returned unchanged.
pub fn preprocess_wallet_name(label: &str) -> String {
    match label.split_once('@') {
        Some((local, domain)) => format!("{}.{}", hex::encode(Sha224::digest(local.as_bytes())), domain),
        None => label.to_string(),
    }
}
