// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Root zone DS trust anchor

use super::DnssecError;
use hickory_proto::rr::dnssec::rdata::{DNSKEY, DS};
use hickory_proto::rr::dnssec::{Algorithm, DigestType, PublicKeyBuf, TrustAnchor as RootKeys};
use hickory_proto::rr::Name;
use std::fmt;
use std::str::FromStr;

/// A DS record anchoring the DNSSEC chain of trust, e.g.
/// `. IN DS 20326 8 2 E06D44B8...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    pub owner: String,
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl TrustAnchor {
    /// Expected digest length for the digest type, if known
    fn expected_digest_len(&self) -> Option<usize> {
        match self.digest_type {
            1 => Some(20),
            2 => Some(32),
            4 => Some(48),
            _ => None,
        }
    }

    /// The anchor as DS record data
    pub fn to_ds(&self) -> Result<DS, DnssecError> {
        let digest_type = DigestType::from_u8(self.digest_type).map_err(|e| {
            DnssecError::TrustAnchor(format!("Unsupported digest type {}: {}", self.digest_type, e))
        })?;

        Ok(DS::new(
            self.key_tag,
            Algorithm::from_u8(self.algorithm),
            digest_type,
            self.digest.clone(),
        ))
    }

    /// Whether the digest of this anchor refers to `key`
    pub fn covers(&self, key: &DNSKEY) -> bool {
        self.to_ds()
            .map(|ds| ds.covers(&Name::root(), key).unwrap_or(false))
            .unwrap_or(false)
    }

    /// The root keys this anchor refers to, as the key set a validator
    /// starts its chain of trust from.
    pub fn root_keys<'a>(&self, keys: impl IntoIterator<Item = &'a DNSKEY>) -> Result<RootKeys, DnssecError> {
        if self.owner != "." {
            return Err(DnssecError::TrustAnchor(format!(
                "Trust anchor must be owned by the root, got {}",
                self.owner
            )));
        }

        let ds = self.to_ds()?;
        let mut trusted = RootKeys::new();
        for key in keys {
            if ds.covers(&Name::root(), key).unwrap_or(false) {
                trusted.insert_trust_anchor(&PublicKeyBuf::new(key.public_key().to_vec()));
            }
        }

        if trusted.is_empty() {
            return Err(DnssecError::ValidationFailed(format!(
                "No root DNSKEY matches trust anchor with key tag {}",
                self.key_tag
            )));
        }
        Ok(trusted)
    }
}

impl FromStr for TrustAnchor {
    type Err = DnssecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [owner, class, rtype, key_tag, algorithm, digest_type, digest @ ..] = fields.as_slice()
        else {
            return Err(DnssecError::TrustAnchor(format!("Malformed trust anchor: {}", s)));
        };

        if !class.eq_ignore_ascii_case("IN") || !rtype.eq_ignore_ascii_case("DS") {
            return Err(DnssecError::TrustAnchor(format!(
                "Trust anchor must be an IN DS record: {}",
                s
            )));
        }
        if digest.is_empty() {
            return Err(DnssecError::TrustAnchor("Trust anchor has no digest".to_string()));
        }

        let number_err = |field: &str| DnssecError::TrustAnchor(format!("Invalid {} in trust anchor", field));
        let anchor = TrustAnchor {
            owner: owner.to_string(),
            key_tag: key_tag.parse().map_err(|_| number_err("key tag"))?,
            algorithm: algorithm.parse().map_err(|_| number_err("algorithm"))?,
            digest_type: digest_type.parse().map_err(|_| number_err("digest type"))?,
            digest: hex::decode(digest.concat())
                .map_err(|e| DnssecError::TrustAnchor(format!("Invalid trust anchor digest: {}", e)))?,
        };

        if let Some(len) = anchor.expected_digest_len() {
            if anchor.digest.len() != len {
                return Err(DnssecError::TrustAnchor(format!(
                    "Trust anchor digest is {} bytes, expected {}",
                    anchor.digest.len(),
                    len
                )));
            }
        }

        Ok(anchor)
    }
}

impl fmt::Display for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} IN DS {} {} {} {}",
            self.owner,
            self.key_tag,
            self.algorithm,
            self.digest_type,
            hex::encode_upper(&self.digest)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ROOT_TRUST_ANCHOR;

    #[test]
    fn test_parse_root_anchor() {
        let anchor: TrustAnchor = ROOT_TRUST_ANCHOR.parse().unwrap();
        assert_eq!(anchor.owner, ".");
        assert_eq!(anchor.key_tag, 20326);
        assert_eq!(anchor.algorithm, 8);
        assert_eq!(anchor.digest_type, 2);
        assert_eq!(anchor.digest.len(), 32);
        assert_eq!(anchor.to_string(), ROOT_TRUST_ANCHOR);
    }

    #[test]
    fn test_rejects_malformed_anchor() {
        assert!(matches!(
            "not an anchor".parse::<TrustAnchor>(),
            Err(DnssecError::TrustAnchor(_))
        ));
        assert!(". IN DNSKEY 257 3 8 AwEAAa".parse::<TrustAnchor>().is_err());
        assert!(". IN DS 20326 8 2 E06D44".parse::<TrustAnchor>().is_err());
        assert!(". IN DS 20326 8 2 ZZ".parse::<TrustAnchor>().is_err());
    }

    /// Root KSK-2017 public key
    const KSK_2017: &str = "AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3+/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kvArMtNROxVQuCaSnIDdD5LKyWbRd2n9WGe2R8PzgCmr3EgVLrjyBxWezF0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+eoZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfdRUfhHdY6+cn8HFRm+2hM8AnXGXws9555KrUB5qihylGa8subX2Nn6UwNR1AkUTV74bU=";

    fn ksk_2017() -> DNSKEY {
        use base64::Engine;
        let key = base64::engine::general_purpose::STANDARD.decode(KSK_2017).unwrap();
        DNSKEY::new(true, true, false, Algorithm::RSASHA256, key)
    }

    #[test]
    fn test_root_anchor_covers_ksk() {
        let anchor: TrustAnchor = ROOT_TRUST_ANCHOR.parse().unwrap();
        let ksk = ksk_2017();
        assert_eq!(ksk.calculate_key_tag().unwrap(), anchor.key_tag);
        assert!(anchor.covers(&ksk));

        let keys = anchor.root_keys([&ksk]).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_dnskey_bytes(ksk.public_key()));
    }

    #[test]
    fn test_bogus_anchor_matches_no_key() {
        let bogus: TrustAnchor = format!(". IN DS 11111 8 2 {}", "00".repeat(32)).parse().unwrap();
        let ksk = ksk_2017();
        assert!(!bogus.covers(&ksk));
        assert!(matches!(bogus.root_keys([&ksk]), Err(DnssecError::ValidationFailed(_))));
    }

    #[test]
    fn test_rejects_non_root_anchor() {
        let anchor: TrustAnchor = ROOT_TRUST_ANCHOR.replacen('.', "example.", 1).parse().unwrap();
        assert!(matches!(
            anchor.root_keys([&ksk_2017()]),
            Err(DnssecError::TrustAnchor(_))
        ));
    }
}
