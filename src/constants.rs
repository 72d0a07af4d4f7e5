// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

/// Root zone trust anchor (KSK-2017) in DS presentation format
pub const ROOT_TRUST_ANCHOR: &str =
    ". IN DS 20326 8 2 E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D";

/// Backup resolvers used once the selected server fails (Google Public DNS)
pub const DEFAULT_BACKUP_DNS_SERVERS: [&str; 2] = ["8.8.8.8", "8.8.4.4"];

/// Default DNS port
pub const DNS_PORT: u16 = 53;

/// DNS class used by validating resolvers to carry a validation failure
/// reason as a TXT record owned by the root name
pub const VALIDATION_REASON_CLASS: u16 = 65280;

/// EDNS UDP payload size advertised in outgoing queries
pub const EDNS_PAYLOAD_SIZE: u16 = 4096;

/// Default timeout for a single DNS exchange, in seconds
pub const DNS_TIMEOUT_SECS: u64 = 5;

/// Default timeout for the TLS certificate inspection, in seconds
pub const TLS_TIMEOUT_SECS: u64 = 10;

/// Default timeout for the wallet name URL fetch, in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Largest wallet name URL response body accepted, in bytes
pub const MAX_RESPONSE_BODY_BYTES: usize = 64 * 1024;

/// Label prefix under which a wallet name publishes its currency list
pub const WALLET_LABEL: &str = "_wallet";

/// Config file name inside the project config directory
pub const CONFIG_FILE_NAME: &str = "config.json";
