// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! TLSA (RFC 6698) validation of HTTPS endpoints

pub mod certificate;
pub mod chain;
pub mod matcher;
pub mod peer;
pub mod record;
pub mod trust_store;
pub mod validator;

pub use certificate::{Certificate, CertificateError};
pub use peer::{CertificateSource, TlsInspector};
pub use record::{tlsa_query_name, CertUsage, MatchingType, Selector, TlsaRecord};
pub use trust_store::TrustAnchorStore;
pub use validator::{TlsaValidator, TlsaVerdict};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TlsaError {
    #[error("Invalid TLSA record: {0}")]
    InvalidRecord(String),

    #[error("URL has no usable host or port: {0}")]
    InvalidUrl(String),

    /// The live TLS connection could not be established
    #[error("TLS handshake failed: {0}")]
    Handshake(String),

    #[error("TLS handshake timed out")]
    Timeout,

    #[error(transparent)]
    Certificate(#[from] CertificateError),
}

/// Certificate chains for tests, generated with rcgen
#[cfg(test)]
pub(crate) mod test_support {
    use super::Certificate;
    use rcgen::{
        BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    };
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use rustls::ServerConfig;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_rustls::TlsAcceptor;

    pub struct TestChain {
        pub leaf: Certificate,
        pub intermediate: Certificate,
        pub root: Certificate,
    }

    impl TestChain {
        /// Leaf first, root last, as presented in a handshake
        pub fn presented(&self) -> Vec<Certificate> {
            vec![self.leaf.clone(), self.intermediate.clone(), self.root.clone()]
        }
    }

    fn params(common_name: &str, ca: bool) -> CertificateParams {
        let mut params = CertificateParams::new(vec![format!("{}.example", common_name)]).unwrap();
        params.distinguished_name = DistinguishedName::new();
        params.distinguished_name.push(DnType::CommonName, common_name);
        if ca {
            params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        }
        params
    }

    pub fn chain(name: &str) -> TestChain {
        let root_key = KeyPair::generate().unwrap();
        let root = params(&format!("{} root", name), true).self_signed(&root_key).unwrap();

        let intermediate_key = KeyPair::generate().unwrap();
        let intermediate = params(&format!("{} intermediate", name), true)
            .signed_by(&intermediate_key, &root, &root_key)
            .unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let leaf = params(name, false)
            .signed_by(&leaf_key, &intermediate, &intermediate_key)
            .unwrap();

        TestChain {
            leaf: Certificate::from(leaf.der().clone()),
            intermediate: Certificate::from(intermediate.der().clone()),
            root: Certificate::from(root.der().clone()),
        }
    }

    pub fn self_signed(name: &str) -> Certificate {
        let key = KeyPair::generate().unwrap();
        let cert = params(name, false).self_signed(&key).unwrap();
        Certificate::from(cert.der().clone())
    }

    /// Local HTTPS endpoint with a self-signed `localhost` certificate
    pub struct HttpsServer {
        pub addr: SocketAddr,
        pub cert: Certificate,
    }

    /// Serve `body` over TLS on a loopback port until the test ends
    pub async fn https_server(body: &str) -> HttpsServer {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
        params.distinguished_name = DistinguishedName::new();
        params.distinguished_name.push(DnType::CommonName, "localhost");
        let cert = params.self_signed(&key).unwrap();
        let private_key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));

        let config = ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![cert.der().clone()], private_key)
            .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                // Clients that reject the certificate abort the handshake
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    continue;
                };
                let mut buf = [0u8; 1024];
                if matches!(tls.read(&mut buf).await, Ok(len) if len > 0) {
                    let _ = tls.write_all(response.as_bytes()).await;
                }
                let _ = tls.shutdown().await;
            }
        });

        HttpsServer {
            addr,
            cert: Certificate::from(cert.der().clone()),
        }
    }
}
