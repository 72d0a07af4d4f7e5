// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Decides whether a URL's live certificates satisfy its TLSA record

use super::chain::is_valid_cert_chain;
use super::matcher::match_certificate;
use super::{
    tlsa_query_name, CertUsage, Certificate, CertificateSource, TlsaError, TlsaRecord,
    TrustAnchorStore,
};
use crate::dnssec::DnssecLookup;
use hickory_proto::rr::RecordType;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Outcome of TLSA validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsaVerdict {
    /// The presented chain satisfies the record
    Valid,
    /// Trust this certificate as a root for the connection, then proceed
    AcceptRoot(Certificate),
    Denied,
}

impl fmt::Display for TlsaVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsaVerdict::Valid => write!(f, "valid"),
            TlsaVerdict::AcceptRoot(cert) => write!(f, "accept root {}", cert.subject_name()),
            TlsaVerdict::Denied => write!(f, "denied"),
        }
    }
}

pub struct TlsaValidator {
    lookup: Arc<dyn DnssecLookup>,
    peer: Arc<dyn CertificateSource>,
    trust_store: TrustAnchorStore,
}

impl TlsaValidator {
    pub fn new(
        lookup: Arc<dyn DnssecLookup>,
        peer: Arc<dyn CertificateSource>,
        trust_store: TrustAnchorStore,
    ) -> Self {
        Self {
            lookup,
            peer,
            trust_store,
        }
    }

    pub fn trust_store(&self) -> &TrustAnchorStore {
        &self.trust_store
    }

    /// Authenticated TLSA record for the URL's endpoint, if one is published
    /// and well formed
    pub async fn fetch_tlsa_record(&self, url: &Url) -> Option<TlsaRecord> {
        let name = match tlsa_query_name(url) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("{}", e);
                return None;
            }
        };

        let value = match self.lookup.resolve(&name, RecordType::TLSA).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("No TLSA record for {}: {}", name, e);
                return None;
            }
        };
        if value.is_empty() {
            return None;
        }

        match value.parse::<TlsaRecord>() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Ignoring TLSA record for {}: {}", name, e);
                None
            }
        }
    }

    pub async fn validate(&self, url: &Url) -> Result<TlsaVerdict, TlsaError> {
        match self.fetch_tlsa_record(url).await {
            Some(record) => self.validate_record(url, &record).await,
            None => Ok(TlsaVerdict::Denied),
        }
    }

    /// Check the live certificates of `url` against an already fetched record
    pub async fn validate_record(&self, url: &Url, record: &TlsaRecord) -> Result<TlsaVerdict, TlsaError> {
        let chain = self.peer.peer_certificates(url).await?;
        if chain.is_empty() {
            return Ok(TlsaVerdict::Denied);
        }

        let Some(index) = match_certificate(record, &chain) else {
            tracing::debug!("No presented certificate matches the TLSA record for {}", url);
            return Ok(TlsaVerdict::Denied);
        };
        let matching = &chain[index];
        let leaf = &chain[0];

        let verdict = match record.cert_usage {
            CertUsage::CaConstraint => {
                if index != 0 && is_valid_cert_chain(&self.trust_store, matching, &chain).await {
                    TlsaVerdict::Valid
                } else {
                    TlsaVerdict::Denied
                }
            }
            CertUsage::ServiceCert => {
                if index == 0 && is_valid_cert_chain(&self.trust_store, matching, &chain).await {
                    TlsaVerdict::Valid
                } else {
                    TlsaVerdict::Denied
                }
            }
            CertUsage::TrustAnchor => {
                let is_last = index == chain.len() - 1;
                if is_last && is_valid_cert_chain(&self.trust_store, leaf, &chain).await {
                    TlsaVerdict::AcceptRoot(matching.clone())
                } else {
                    TlsaVerdict::Denied
                }
            }
            // No PKIX validation for domain-issued certificates
            CertUsage::DomainIssued => TlsaVerdict::AcceptRoot(matching.clone()),
        };

        tracing::debug!("TLSA {:?} verdict for {}: {}", record.cert_usage, url, verdict);
        Ok(verdict)
    }
}
