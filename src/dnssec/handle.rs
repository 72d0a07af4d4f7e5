// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Adapter letting hickory's DNSSEC validator query through a [`DnsTransport`]

use super::{DnsTransport, DnssecError};
use crate::constants::{EDNS_PAYLOAD_SIZE, VALIDATION_REASON_CLASS};
use futures_util::stream::{self, Stream};
use hickory_proto::error::{ProtoError, ProtoErrorKind};
use hickory_proto::op::{Edns, Message, ResponseCode};
use hickory_proto::rr::RData;
use hickory_proto::xfer::{DnsHandle, DnsRequest, DnsResponse};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Failure of a single exchange, or of proving its answer
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    #[error("{0}")]
    Transport(String),

    /// The server refused the answer and said why
    #[error("{0}")]
    Rejected(String),

    /// The server failed without giving a reason
    #[error("Server answered {0}")]
    Unexplained(ResponseCode),

    #[error(transparent)]
    Proof(#[from] ProtoError),
}

impl From<ExchangeError> for DnssecError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::Transport(message) => DnssecError::LookupFailure(message),
            ExchangeError::Rejected(reason) => DnssecError::ValidationFailed(reason),
            ExchangeError::Unexplained(_) => DnssecError::UnknownFailure,
            ExchangeError::Proof(e) => match e.kind() {
                ProtoErrorKind::Io(_) | ProtoErrorKind::Timeout => DnssecError::LookupFailure(e.to_string()),
                _ => DnssecError::ValidationFailed(e.to_string()),
            },
        }
    }
}

/// Sends every request to one server through a transport
#[derive(Clone)]
pub struct TransportHandle {
    transport: Arc<dyn DnsTransport>,
    server: SocketAddr,
}

impl TransportHandle {
    pub fn new(transport: Arc<dyn DnsTransport>, server: SocketAddr) -> Self {
        Self { transport, server }
    }
}

impl DnsHandle for TransportHandle {
    type Response = Pin<Box<dyn Stream<Item = Result<DnsResponse, ExchangeError>> + Send>>;
    type Error = ExchangeError;

    fn send<R: Into<DnsRequest> + Unpin + Send + 'static>(&self, request: R) -> Self::Response {
        let (mut message, _) = request.into().into_parts();
        let edns = message.extensions_mut().get_or_insert_with(Edns::new);
        edns.set_dnssec_ok(true);
        edns.set_max_payload(EDNS_PAYLOAD_SIZE);

        Box::pin(stream::once(exchange(
            Arc::clone(&self.transport),
            self.server,
            message,
        )))
    }
}

async fn exchange(
    transport: Arc<dyn DnsTransport>,
    server: SocketAddr,
    query: Message,
) -> Result<DnsResponse, ExchangeError> {
    let response = transport
        .exchange(server, &query)
        .await
        .map_err(|e| ExchangeError::Transport(e.to_string()))?;

    match response.response_code() {
        ResponseCode::NoError | ResponseCode::NXDomain => Ok(DnsResponse::from_message(response)?),
        code => match validation_failure_reason(&response) {
            Some(reason) => {
                tracing::debug!("{} rejected the answer: {}", server, reason);
                Err(ExchangeError::Rejected(reason))
            }
            None => Err(ExchangeError::Unexplained(code)),
        },
    }
}

/// Reason a validating upstream attaches to a failed answer, as a TXT record
/// owned by the root name in a private class
pub fn validation_failure_reason(response: &Message) -> Option<String> {
    response
        .additionals()
        .iter()
        .filter(|record| record.name().is_root())
        .filter(|record| u16::from(record.dns_class()) == VALIDATION_REASON_CLASS)
        .find_map(|record| match record.data() {
            Some(RData::TXT(txt)) => Some(txt_to_string(txt)),
            _ => None,
        })
}

/// Concatenated character strings of a TXT record
pub fn txt_to_string(txt: &hickory_proto::rr::rdata::TXT) -> String {
    txt.txt_data()
        .iter()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect()
}
