// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! DER certificates as presented in a TLS handshake

use rustls::pki_types::CertificateDer;
use thiserror::Error;
use x509_parser::certificate::X509Certificate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("Failed to parse certificate: {0}")]
    Parse(String),
}

/// An X.509 certificate, compared by its DER encoding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Certificate(CertificateDer<'static>);

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self(CertificateDer::from(der.into()))
    }

    pub fn der(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn as_certificate_der(&self) -> &CertificateDer<'static> {
        &self.0
    }

    pub fn parse(&self) -> Result<X509Certificate<'_>, CertificateError> {
        let (_, parsed) = x509_parser::parse_x509_certificate(self.der())
            .map_err(|e| CertificateError::Parse(e.to_string()))?;
        Ok(parsed)
    }

    /// DER-encoded SubjectPublicKeyInfo
    pub fn spki(&self) -> Result<&[u8], CertificateError> {
        let parsed = self.parse()?;
        Ok(parsed.tbs_certificate.subject_pki.raw)
    }

    /// Subject distinguished name, for display
    pub fn subject_name(&self) -> String {
        match self.parse() {
            Ok(parsed) => parsed.subject().to_string(),
            Err(_) => format!("<unparsable certificate, {} bytes>", self.der().len()),
        }
    }
}

impl From<CertificateDer<'static>> for Certificate {
    fn from(der: CertificateDer<'static>) -> Self {
        Self(der)
    }
}
