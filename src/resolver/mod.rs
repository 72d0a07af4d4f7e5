// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Wallet name resolution
//!
//! A wallet name publishes its currency list as a TXT record at
//! `_wallet.<name>.` and one TXT record per currency at
//! `_<currency>._wallet.<name>.`. A currency record holds a payment address
//! or URI, or the base64 encoding of an HTTPS URL serving one. Every lookup
//! must be DNSSEC authenticated; HTTPS endpoints may additionally be pinned
//! with TLSA.

pub mod fetch;
pub mod preprocess;
pub mod target;

pub use fetch::{FetchError, HttpsFetcher, ReqwestFetcher};
pub use preprocess::preprocess_wallet_name;
pub use target::DecodedWalletTarget;

use crate::config::WalletNsConfig;
use crate::constants::WALLET_LABEL;
use crate::dns::{ensure_dot, DnsBootstrap};
use crate::dnssec::{DnssecError, DnssecLookup, DnssecResolver, UdpTransport};
use crate::error::{SetupError, WalletNameError};
use crate::payment::{PaymentUri, PaymentUriParser, SchemeRegistry};
use crate::tlsa::{TlsInspector, TlsaValidator, TlsaVerdict, TrustAnchorStore};
use hickory_proto::rr::RecordType;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

pub struct WalletNameResolver {
    lookup: Arc<dyn DnssecLookup>,
    tlsa: TlsaValidator,
    fetcher: Arc<dyn HttpsFetcher>,
    parser: Arc<dyn PaymentUriParser>,
    /// Next backup server to switch to
    backup_cursor: Mutex<usize>,
    remember_accepted_roots: bool,
}

impl WalletNameResolver {
    pub fn new(
        lookup: Arc<dyn DnssecLookup>,
        tlsa: TlsaValidator,
        fetcher: Arc<dyn HttpsFetcher>,
        parser: Arc<dyn PaymentUriParser>,
    ) -> Self {
        Self {
            lookup,
            tlsa,
            fetcher,
            parser,
            backup_cursor: Mutex::new(0),
            remember_accepted_roots: false,
        }
    }

    /// Also add roots accepted through TLSA to the shared trust store
    pub fn remember_accepted_roots(mut self, remember: bool) -> Self {
        self.remember_accepted_roots = remember;
        self
    }

    /// Wire the production collaborators from `config`
    pub fn from_config(config: &WalletNsConfig, bootstrap: &dyn DnsBootstrap) -> Result<Self, SetupError> {
        let transport = Arc::new(UdpTransport::new(config.dns_timeout()));
        let lookup: Arc<dyn DnssecLookup> = Arc::new(DnssecResolver::new(
            &bootstrap.system_servers(),
            &config.backup_dns_servers,
            config.dns_port,
            config.trust_anchor.clone(),
            transport,
        )?);

        let inspector = Arc::new(TlsInspector::new(config.tls_timeout())?);
        let tlsa = TlsaValidator::new(lookup.clone(), inspector, TrustAnchorStore::platform());
        let fetcher = Arc::new(ReqwestFetcher::new(config.http_timeout())?);
        let parser = Arc::new(SchemeRegistry::new(config.currency_schemes.clone()));

        Ok(Self::new(lookup, tlsa, fetcher, parser)
            .remember_accepted_roots(config.remember_accepted_roots))
    }

    pub fn tlsa_validator(&self) -> &TlsaValidator {
        &self.tlsa
    }

    /// Currency codes published for `label`
    pub async fn get_available_currencies(&self, label: &str) -> Result<Vec<String>, WalletNameError> {
        if label.is_empty() {
            return Err(WalletNameError::InvalidInput);
        }

        let name = format!(
            "{}.{}",
            WALLET_LABEL,
            ensure_dot(&preprocess_wallet_name(&label.to_lowercase()))
        );
        let currencies = self
            .lookup_txt(&name)
            .await?
            .ok_or(WalletNameError::DoesNotExist)?;

        Ok(currencies.split_whitespace().map(str::to_string).collect())
    }

    /// Resolve `label` to a payment URI for `currency`
    pub async fn resolve(
        &self,
        label: &str,
        currency: &str,
        validate_tlsa: bool,
    ) -> Result<PaymentUri, WalletNameError> {
        if label.is_empty() {
            return Err(WalletNameError::InvalidInput);
        }
        let label = label.to_lowercase();
        let currency = currency.to_lowercase();

        let name = format!(
            "_{}.{}.{}",
            currency,
            WALLET_LABEL,
            ensure_dot(&preprocess_wallet_name(&label))
        );
        let answer = self
            .lookup_txt(&name)
            .await?
            .ok_or(WalletNameError::CurrencyUnavailable)?;

        match target::decode(&answer) {
            DecodedWalletTarget::RedirectUrl(url) => {
                tracing::debug!("{} redirects to {}", name, url);
                self.process_wallet_name_url(&url, &currency, validate_tlsa).await
            }
            DecodedWalletTarget::DirectAddress(decoded) => {
                *self.backup_cursor.lock().await = 0;
                self.parse_direct(&currency, &[decoded.as_str(), answer.as_str()])
            }
        }
    }

    /// Fetch the payment URI for `currency` served at `url`, enforcing its
    /// TLSA record when `validate_tlsa` is set
    pub async fn process_wallet_name_url(
        &self,
        url: &Url,
        currency: &str,
        validate_tlsa: bool,
    ) -> Result<PaymentUri, WalletNameError> {
        if url.scheme() != "https" {
            return Err(WalletNameError::UrlFetchFailed(format!(
                "Refusing to fetch non-HTTPS URL {}",
                url
            )));
        }

        let mut extra_root = None;
        if validate_tlsa {
            match self.tlsa.validate(url).await {
                Ok(TlsaVerdict::Valid) => {}
                Ok(TlsaVerdict::AcceptRoot(cert)) => {
                    if self.remember_accepted_roots {
                        self.tlsa.trust_store().accept(cert.clone()).await;
                    }
                    extra_root = Some(cert);
                }
                Ok(TlsaVerdict::Denied) => {
                    return Err(WalletNameError::TlsaValidationFailed(format!(
                        "{} does not satisfy its TLSA record",
                        url
                    )));
                }
                Err(e) => return Err(WalletNameError::TlsaValidationFailed(e.to_string())),
            }
        }

        let body = self
            .fetcher
            .get(url, extra_root.as_ref())
            .await
            .map_err(|e| WalletNameError::UrlFetchFailed(e.to_string()))?;

        let data = fetch::join_lines(&body);
        self.parser
            .parse(currency, &data)
            .map_err(|e| WalletNameError::InvalidPaymentData(e.to_string()))
    }

    /// Parse each candidate as a payment URI, then with the currency's
    /// scheme prepended
    fn parse_direct(&self, currency: &str, candidates: &[&str]) -> Result<PaymentUri, WalletNameError> {
        let scheme = self.parser.scheme_for(currency);
        let mut last_error = None;

        for (i, candidate) in candidates.iter().enumerate() {
            if candidates[..i].contains(candidate) {
                continue;
            }

            let prefixed = scheme.as_ref().map(|scheme| format!("{}:{}", scheme, candidate));
            let attempts = std::iter::once(candidate.to_string()).chain(prefixed);
            for attempt in attempts {
                match self.parser.parse(currency, &attempt) {
                    Ok(uri) => return Ok(uri),
                    Err(e) => last_error = Some(e),
                }
            }
        }

        let reason = match last_error {
            Some(e) => e.to_string(),
            None => "no payment data".to_string(),
        };
        Err(WalletNameError::InvalidPaymentData(reason))
    }

    /// Authenticated TXT lookup with fail-over to the backup servers.
    /// `None` means nothing is published.
    async fn lookup_txt(&self, name: &str) -> Result<Option<String>, WalletNameError> {
        loop {
            let error = match self.lookup.resolve(name, RecordType::TXT).await {
                Ok(value) if value.is_empty() => return Ok(None),
                Ok(value) => return Ok(Some(value)),
                Err(DnssecError::NoAnswer) => return Ok(None),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(WalletNameError::LookupFailure(e.to_string())),
            };

            let mut cursor = self.backup_cursor.lock().await;
            if *cursor >= self.lookup.backup_server_count().await {
                return Err(WalletNameError::LookupFailure(error.to_string()));
            }

            tracing::debug!("Lookup of {} failed ({}), trying backup server {}", name, error, *cursor);
            self.lookup
                .use_backup_server(*cursor)
                .await
                .map_err(|e| WalletNameError::LookupFailure(e.to_string()))?;
            *cursor += 1;
        }
    }
}
