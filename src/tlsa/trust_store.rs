// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Shared, append-only set of trusted root certificates

use super::Certificate;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle to the trusted roots. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct TrustAnchorStore {
    roots: Arc<RwLock<Vec<Certificate>>>,
}

impl TrustAnchorStore {
    /// Seed from the platform certificate store
    pub fn platform() -> Self {
        let result = rustls_native_certs::load_native_certs();
        for error in &result.errors {
            tracing::warn!("Failed to load platform certificate: {}", error);
        }
        tracing::debug!("Loaded {} platform root certificates", result.certs.len());

        Self::from_certificates(result.certs.into_iter().map(Certificate::from))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_certificates(certs: impl IntoIterator<Item = Certificate>) -> Self {
        Self {
            roots: Arc::new(RwLock::new(certs.into_iter().collect())),
        }
    }

    /// Copy of the current roots
    pub async fn snapshot(&self) -> Vec<Certificate> {
        self.roots.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.roots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.roots.read().await.is_empty()
    }

    /// Trust `cert` from now on. Returns false when it was already trusted.
    pub async fn accept(&self, cert: Certificate) -> bool {
        let mut roots = self.roots.write().await;
        if roots.contains(&cert) {
            return false;
        }
        tracing::info!("Accepted root certificate {}", cert.subject_name());
        roots.push(cert);
        true
    }
}
