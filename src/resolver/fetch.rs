// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! HTTPS retrieval of redirected payment URIs

use crate::constants::MAX_RESPONSE_BODY_BYTES;
use crate::tlsa::Certificate;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(u16),

    /// Redirects are not followed, the URL itself must serve the payment URI
    #[error("Refusing to follow redirect ({0}) to {1}")]
    Redirect(u16, String),

    #[error("Response body exceeds {0} bytes")]
    TooLarge(usize),
}

/// Performs HTTPS GET requests
#[async_trait::async_trait]
pub trait HttpsFetcher: Send + Sync {
    /// Fetch `url` and return the body as text. `extra_root` is trusted in
    /// addition to the platform roots for this request only.
    async fn get(&self, url: &Url, extra_root: Option<&Certificate>) -> Result<String, FetchError>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = client_builder(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    fn client_trusting(&self, root: &Certificate) -> Result<reqwest::Client, FetchError> {
        let cert = reqwest::Certificate::from_der(root.der())
            .map_err(|e| FetchError::Client(e.to_string()))?;

        client_builder(self.timeout)
            .add_root_certificate(cert)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))
    }
}

#[async_trait::async_trait]
impl HttpsFetcher for ReqwestFetcher {
    async fn get(&self, url: &Url, extra_root: Option<&Certificate>) -> Result<String, FetchError> {
        let client = match extra_root {
            Some(root) => {
                tracing::debug!("Trusting {} for {}", root.subject_name(), url);
                self.client_trusting(root)?
            }
            None => self.client.clone(),
        };

        let mut response = client.get(url.clone()).send().await?;
        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            tracing::warn!("{} redirects to {:?}, not following", url, location);
            return Err(FetchError::Redirect(status.as_u16(), location));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > MAX_RESPONSE_BODY_BYTES as u64)
        {
            return Err(FetchError::TooLarge(MAX_RESPONSE_BODY_BYTES));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_RESPONSE_BODY_BYTES {
                return Err(FetchError::TooLarge(MAX_RESPONSE_BODY_BYTES));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Join the lines of a response body without their terminators
pub fn join_lines(body: &str) -> String {
    body.lines().collect::<String>().trim().to_string()
}
