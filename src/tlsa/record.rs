// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! TLSA record model and query naming

use super::TlsaError;
use crate::dns::ensure_dot;
use std::str::FromStr;
use url::Url;

/// How the associated certificate constrains the presented chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertUsage {
    /// A CA in the PKIX path (usage 0)
    CaConstraint,
    /// The PKIX-valid end entity (usage 1)
    ServiceCert,
    /// A trust anchor for the presented chain (usage 2)
    TrustAnchor,
    /// The end entity, without PKIX validation (usage 3)
    DomainIssued,
}

impl TryFrom<u8> for CertUsage {
    type Error = TlsaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CertUsage::CaConstraint),
            1 => Ok(CertUsage::ServiceCert),
            2 => Ok(CertUsage::TrustAnchor),
            3 => Ok(CertUsage::DomainIssued),
            other => Err(TlsaError::InvalidRecord(format!("Unknown certificate usage {}", other))),
        }
    }
}

/// Part of the certificate the association data refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    FullCertificate,
    SubjectPublicKeyInfo,
}

impl TryFrom<u8> for Selector {
    type Error = TlsaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Selector::FullCertificate),
            1 => Ok(Selector::SubjectPublicKeyInfo),
            other => Err(TlsaError::InvalidRecord(format!("Unknown selector {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingType {
    Exact,
    Sha256,
    Sha512,
}

impl TryFrom<u8> for MatchingType {
    type Error = TlsaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MatchingType::Exact),
            1 => Ok(MatchingType::Sha256),
            2 => Ok(MatchingType::Sha512),
            other => Err(TlsaError::InvalidRecord(format!("Unknown matching type {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsaRecord {
    pub cert_usage: CertUsage,
    pub selector: Selector,
    pub matching_type: MatchingType,
    pub association_data: Vec<u8>,
}

impl FromStr for TlsaRecord {
    type Err = TlsaError;

    /// Parse the presentation form `usage selector matching-type hex-data`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(' ').collect();
        let [usage, selector, matching_type, data] = fields.as_slice() else {
            return Err(TlsaError::InvalidRecord(format!(
                "Expected 4 fields, found {}",
                fields.len()
            )));
        };

        let number = |field: &str| {
            field
                .parse::<u8>()
                .map_err(|_| TlsaError::InvalidRecord(format!("Invalid field {:?}", field)))
        };

        Ok(TlsaRecord {
            cert_usage: CertUsage::try_from(number(usage)?)?,
            selector: Selector::try_from(number(selector)?)?,
            matching_type: MatchingType::try_from(number(matching_type)?)?,
            association_data: hex::decode(data)
                .map_err(|e| TlsaError::InvalidRecord(format!("Invalid association data: {}", e)))?,
        })
    }
}

/// TLSA owner name for a URL: `_{port}._tcp.{host}.`
pub fn tlsa_query_name(url: &Url) -> Result<String, TlsaError> {
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| TlsaError::InvalidUrl(url.to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| TlsaError::InvalidUrl(url.to_string()))?;

    Ok(format!("_{}._tcp.{}", port, ensure_dot(host)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_name_default_port() {
        let url = Url::parse("https://www.mydomain.com/").unwrap();
        assert_eq!(tlsa_query_name(&url).unwrap(), "_443._tcp.www.mydomain.com.");
    }

    #[test]
    fn test_query_name_specific_port() {
        let url = Url::parse("https://www.mydomain.com:1234/path?q=1").unwrap();
        assert_eq!(tlsa_query_name(&url).unwrap(), "_1234._tcp.www.mydomain.com.");
    }

    #[test]
    fn test_query_name_without_host() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert!(matches!(tlsa_query_name(&url), Err(TlsaError::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_record() {
        let record: TlsaRecord = "3 1 1 0C72AC70B745AC19998811B131D662C9AC69DBDBE7CB23E5B514B56664C5D3D6"
            .parse()
            .unwrap();

        assert_eq!(record.cert_usage, CertUsage::DomainIssued);
        assert_eq!(record.selector, Selector::SubjectPublicKeyInfo);
        assert_eq!(record.matching_type, MatchingType::Sha256);
        assert_eq!(record.association_data.len(), 32);
        assert_eq!(record.association_data[0], 0x0c);
    }

    #[test]
    fn test_parse_record_wrong_field_count() {
        assert!("3 1 1".parse::<TlsaRecord>().is_err());
        assert!("3 1 1 AB CD".parse::<TlsaRecord>().is_err());
        assert!("".parse::<TlsaRecord>().is_err());
    }

    #[test]
    fn test_parse_record_bad_values() {
        assert!("4 1 1 ABCD".parse::<TlsaRecord>().is_err());
        assert!("3 2 1 ABCD".parse::<TlsaRecord>().is_err());
        assert!("3 1 3 ABCD".parse::<TlsaRecord>().is_err());
        assert!("x 1 1 ABCD".parse::<TlsaRecord>().is_err());
        assert!("3 1 1 XYZ".parse::<TlsaRecord>().is_err());
    }
}
