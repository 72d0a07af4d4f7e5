// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Matching presented certificates against a TLSA record

use super::{Certificate, CertificateError, MatchingType, Selector, TlsaRecord};
use sha2::{Digest, Sha256, Sha512};

/// Bytes of `cert` chosen by `selector`
pub fn selector_data(selector: Selector, cert: &Certificate) -> Result<&[u8], CertificateError> {
    match selector {
        Selector::FullCertificate => Ok(cert.der()),
        Selector::SubjectPublicKeyInfo => cert.spki(),
    }
}

pub fn association_data(matching_type: MatchingType, data: &[u8]) -> Vec<u8> {
    match matching_type {
        MatchingType::Exact => data.to_vec(),
        MatchingType::Sha256 => Sha256::digest(data).to_vec(),
        MatchingType::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Index of the first certificate in `chain` matching `record`
pub fn match_certificate(record: &TlsaRecord, chain: &[Certificate]) -> Option<usize> {
    chain.iter().position(|cert| match selector_data(record.selector, cert) {
        Ok(data) => association_data(record.matching_type, data) == record.association_data,
        Err(e) => {
            tracing::warn!("Skipping certificate during TLSA match: {}", e);
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlsa::{test_support, CertUsage};

    fn record(selector: Selector, matching_type: MatchingType, cert: &Certificate) -> TlsaRecord {
        TlsaRecord {
            cert_usage: CertUsage::DomainIssued,
            selector,
            matching_type,
            association_data: association_data(matching_type, selector_data(selector, cert).unwrap()),
        }
    }

    #[test]
    fn test_each_matching_type_selects_one_certificate() {
        let chain = test_support::chain("match");
        let presented = chain.presented();

        for matching_type in [MatchingType::Exact, MatchingType::Sha256, MatchingType::Sha512] {
            for (index, cert) in presented.iter().enumerate() {
                let record = record(Selector::FullCertificate, matching_type, cert);
                assert_eq!(match_certificate(&record, &presented), Some(index));
            }
        }
    }

    #[test]
    fn test_spki_selector() {
        let chain = test_support::chain("spki");
        let presented = chain.presented();

        let record = record(Selector::SubjectPublicKeyInfo, MatchingType::Sha256, &chain.intermediate);
        assert_eq!(match_certificate(&record, &presented), Some(1));
    }

    #[test]
    fn test_no_match() {
        let chain = test_support::chain("present");
        let other = test_support::self_signed("other");

        let record = record(Selector::FullCertificate, MatchingType::Sha512, &other);
        assert_eq!(match_certificate(&record, &chain.presented()), None);
        assert_eq!(match_certificate(&record, &[]), None);
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(association_data(MatchingType::Exact, b"abc"), b"abc".to_vec());
        assert_eq!(association_data(MatchingType::Sha256, b"abc").len(), 32);
        assert_eq!(association_data(MatchingType::Sha512, b"abc").len(), 64);
    }

    #[test]
    fn test_unparsable_certificate_is_skipped() {
        let chain = test_support::chain("skip");
        let garbage = Certificate::from_der(vec![0x01, 0x02]);
        let presented = vec![garbage, chain.leaf.clone()];

        let record = record(Selector::SubjectPublicKeyInfo, MatchingType::Exact, &chain.leaf);
        assert_eq!(match_certificate(&record, &presented), Some(1));
    }
}
