// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Live TLS connection used to observe the certificates a server presents

use super::{Certificate, TlsaError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as TlsError, SignatureScheme};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use url::Url;

/// Fetches the certificate chain presented by the server behind a URL
#[async_trait::async_trait]
pub trait CertificateSource: Send + Sync {
    /// Presented chain, leaf first
    async fn peer_certificates(&self, url: &Url) -> Result<Vec<Certificate>, TlsaError>;
}

/// Accepts whatever chain the server presents. The handshake signature is
/// still checked so the chain belongs to the peer.
#[derive(Debug)]
struct ObservingVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for ObservingVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}

pub struct TlsInspector {
    connector: TlsConnector,
    timeout: Duration,
}

impl TlsInspector {
    pub fn new(timeout: Duration) -> Result<Self, TlsaError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| TlsaError::Handshake(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(ObservingVerifier { provider }))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }
}

/// Host and port to connect to for `url`
fn endpoint(url: &Url) -> Result<(String, u16), TlsaError> {
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| TlsaError::InvalidUrl(url.to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| TlsaError::InvalidUrl(url.to_string()))?;

    Ok((host.trim_start_matches('[').trim_end_matches(']').to_string(), port))
}

#[async_trait::async_trait]
impl CertificateSource for TlsInspector {
    async fn peer_certificates(&self, url: &Url) -> Result<Vec<Certificate>, TlsaError> {
        let (host, port) = endpoint(url)?;
        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| TlsaError::InvalidUrl(format!("{}: {}", host, e)))?;

        tracing::debug!("Inspecting TLS certificates of {}:{}", host, port);

        let attempt = async {
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            let tls = self.connector.connect(server_name, stream).await?;
            let (_, connection) = tls.get_ref();

            let certs: Vec<Certificate> = connection
                .peer_certificates()
                .unwrap_or_default()
                .iter()
                .map(|der| Certificate::from(der.clone().into_owned()))
                .collect();
            Ok::<_, std::io::Error>(certs)
        };

        let certs = tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| TlsaError::Timeout)?
            .map_err(|e| TlsaError::Handshake(e.to_string()))?;

        tracing::debug!("{}:{} presented {} certificates", host, port, certs.len());
        Ok(certs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlsa::test_support;

    #[test]
    fn test_endpoint() {
        let url = Url::parse("https://wallet.example/resolve").unwrap();
        assert_eq!(endpoint(&url).unwrap(), ("wallet.example".to_string(), 443));

        let url = Url::parse("https://[::1]:8443/").unwrap();
        assert_eq!(endpoint(&url).unwrap(), ("::1".to_string(), 8443));
    }

    #[test]
    fn test_endpoint_requires_host() {
        let url = Url::parse("unix:/run/socket").unwrap();
        assert!(matches!(endpoint(&url), Err(TlsaError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_inspector_builds() {
        assert!(TlsInspector::new(Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_presented_chain_is_returned() {
        let server = test_support::https_server("ok").await;
        let inspector = TlsInspector::new(Duration::from_secs(5)).unwrap();

        let url = Url::parse(&format!("https://localhost:{}/", server.addr.port())).unwrap();
        let chain = inspector.peer_certificates(&url).await.unwrap();
        assert_eq!(chain, vec![server.cert.clone()]);
        assert_eq!(chain[0].subject_name(), "CN=localhost");
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let inspector = TlsInspector::new(Duration::from_secs(2)).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = Url::parse(&format!("https://127.0.0.1:{}/", port)).unwrap();
        assert!(matches!(
            inspector.peer_certificates(&url).await,
            Err(TlsaError::Handshake(_))
        ));
    }
}
