// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Host DNS discovery and label helpers

pub mod bootstrap;

pub use bootstrap::{DnsBootstrap, StaticBootstrap, SystemBootstrap};

/// Ensure a DNS label ends with a period
pub fn ensure_dot(label: &str) -> String {
    if label.ends_with('.') {
        label.to_string()
    } else {
        format!("{}.", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dot() {
        assert_eq!(ensure_dot("test.com"), "test.com.");
        assert_eq!(ensure_dot("test.com."), "test.com.");
    }
}
