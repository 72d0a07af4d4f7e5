// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Authenticated lookups against the selected DNS server
//!
//! Answers are proven locally: the root DNSKEY set is matched against the
//! configured DS anchor, and every RRset is checked along the chain of
//! signatures down from it.

use super::handle::{self, TransportHandle};
use super::{DnsTransport, DnssecError, TrustAnchor};
use crate::constants::EDNS_PAYLOAD_SIZE;
use crate::dns::ensure_dot;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::dnssec::rdata::{DNSSECRData, DNSKEY};
use hickory_proto::rr::dnssec::TrustAnchor as RootKeys;
use hickory_proto::rr::{Name, RData, RecordType};
use hickory_proto::xfer::{DnsHandle, DnsRequestOptions, DnssecDnsHandle, FirstAnswer};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A DNSSEC lookup service with switchable backup servers
#[async_trait::async_trait]
pub trait DnssecLookup: Send + Sync {
    /// Look up `label` and return the first record of `record_type` as text
    async fn resolve(&self, label: &str, record_type: RecordType) -> Result<String, DnssecError>;

    /// Number of configured backup servers
    async fn backup_server_count(&self) -> usize;

    /// Make backup server `index` the selected server
    async fn use_backup_server(&self, index: usize) -> Result<(), DnssecError>;
}

#[derive(Debug)]
struct ServerSelection {
    selected: SocketAddr,
    backups: Vec<SocketAddr>,
}

pub struct DnssecResolver {
    transport: Arc<dyn DnsTransport>,
    trust_anchor: String,
    port: u16,
    servers: Mutex<ServerSelection>,
    /// Root keys proven by the last loaded anchor
    root_keys: Mutex<Option<(TrustAnchor, RootKeys)>>,
}

impl DnssecResolver {
    /// Select the first system server, or the first backup when the host has
    /// none configured.
    pub fn new(
        system_servers: &[IpAddr],
        backup_servers: &[IpAddr],
        port: u16,
        trust_anchor: impl Into<String>,
        transport: Arc<dyn DnsTransport>,
    ) -> Result<Self, DnssecError> {
        let backups: Vec<SocketAddr> = backup_servers
            .iter()
            .map(|ip| SocketAddr::new(*ip, port))
            .collect();

        let selected = system_servers
            .first()
            .map(|ip| SocketAddr::new(*ip, port))
            .or_else(|| backups.first().copied())
            .ok_or(DnssecError::NoServers)?;

        tracing::debug!("Selected DNS server {}", selected);

        Ok(Self {
            transport,
            trust_anchor: trust_anchor.into(),
            port,
            servers: Mutex::new(ServerSelection { selected, backups }),
            root_keys: Mutex::new(None),
        })
    }

    pub async fn selected_server(&self) -> SocketAddr {
        self.servers.lock().await.selected
    }

    pub async fn backup_servers(&self) -> Vec<SocketAddr> {
        self.servers.lock().await.backups.clone()
    }

    /// Replace the backup list. The selected server is left untouched.
    pub async fn set_backup_servers(&self, servers: &[IpAddr]) {
        let port = self.port;
        self.servers.lock().await.backups = servers.iter().map(|ip| SocketAddr::new(*ip, port)).collect();
    }

    fn build_query(name: Name, record_type: RecordType) -> Message {
        let mut message = Message::new();
        message
            .set_id(rand::random())
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .set_authentic_data(true)
            .add_query(Query::query(name, record_type));

        let edns = message.extensions_mut().get_or_insert_with(Edns::new);
        edns.set_dnssec_ok(true);
        edns.set_max_payload(EDNS_PAYLOAD_SIZE);

        message
    }

    /// Root keys matching `anchor`. The root DNSKEY set is fetched once per
    /// anchor; its digest binds it to the anchor, so it needs no other proof.
    async fn root_keys(&self, anchor: &TrustAnchor, server: SocketAddr) -> Result<RootKeys, DnssecError> {
        let mut cached = self.root_keys.lock().await;
        if let Some((loaded, keys)) = cached.as_ref() {
            if loaded == anchor {
                return Ok(keys.clone());
            }
        }

        let query = Self::build_query(Name::root(), RecordType::DNSKEY);
        let response = self
            .transport
            .exchange(server, &query)
            .await
            .map_err(|e| DnssecError::LookupFailure(e.to_string()))?;

        let keys: Vec<&DNSKEY> = response
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                Some(RData::DNSSEC(DNSSECRData::DNSKEY(key))) => Some(key),
                _ => None,
            })
            .collect();

        let trusted = anchor.root_keys(keys)?;
        tracing::debug!("Trust anchor {} matches {} root key(s)", anchor.key_tag, trusted.len());
        *cached = Some((anchor.clone(), trusted.clone()));
        Ok(trusted)
    }
}

#[async_trait::async_trait]
impl DnssecLookup for DnssecResolver {
    async fn resolve(&self, label: &str, record_type: RecordType) -> Result<String, DnssecError> {
        let label = ensure_dot(label);
        let name = Name::from_ascii(&label)
            .map_err(|e| DnssecError::InvalidName(format!("{}: {}", label, e)))?;

        let anchor: TrustAnchor = self.trust_anchor.parse()?;
        let server = self.selected_server().await;
        let root_keys = self.root_keys(&anchor, server).await?;

        tracing::debug!("Querying {} {} via {}", label, record_type, server);

        let validator = DnssecDnsHandle::with_trust_anchor(
            TransportHandle::new(Arc::clone(&self.transport), server),
            root_keys,
        );
        let mut options = DnsRequestOptions::default();
        options.use_edns = true;

        let response = validator
            .lookup(Query::query(name, record_type), options)
            .first_answer()
            .await
            .map_err(|e| {
                tracing::debug!("DNSSEC lookup of {} failed: {}", label, e);
                DnssecError::from(e)
            })?;

        interpret_response(&response, record_type)
    }

    async fn backup_server_count(&self) -> usize {
        self.servers.lock().await.backups.len()
    }

    async fn use_backup_server(&self, index: usize) -> Result<(), DnssecError> {
        let mut servers = self.servers.lock().await;
        let backup = *servers.backups.get(index).ok_or(DnssecError::NoServers)?;
        tracing::info!("Switching DNS server from {} to backup {}", servers.selected, backup);
        servers.selected = backup;
        Ok(())
    }
}

/// Map a proven response onto a lookup result
fn interpret_response(response: &Message, record_type: RecordType) -> Result<String, DnssecError> {
    match response.response_code() {
        ResponseCode::NoError => response
            .answers()
            .iter()
            .filter(|record| record.record_type() == record_type)
            .find_map(|record| record.data().map(rdata_to_string))
            .ok_or(DnssecError::NoAnswer),
        // Proven denial of existence
        ResponseCode::NXDomain => Err(DnssecError::NoAnswer),
        _ => Err(DnssecError::UnknownFailure),
    }
}

fn rdata_to_string(rdata: &RData) -> String {
    let text = match rdata {
        RData::TXT(txt) => handle::txt_to_string(txt),
        other => other.to_string(),
    };
    text.replace('"', "")
}

#[cfg(test)]
pub(crate) mod test_support {
    use hickory_proto::op::{Message, MessageType, ResponseCode};
    use hickory_proto::rr::dnssec::rdata::{DNSSECRData, DNSKEY, RRSIG};
    use hickory_proto::rr::dnssec::tbs::rrset_tbs_with_sig;
    use hickory_proto::rr::dnssec::{Algorithm, DigestType, KeyFormat, KeyPair, Private};
    use hickory_proto::rr::rdata::TXT;
    use hickory_proto::rr::{DNSClass, Name, RData, Record};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    pub fn response(code: ResponseCode) -> Message {
        let mut message = Message::new();
        message
            .set_message_type(MessageType::Response)
            .set_authentic_data(true)
            .set_response_code(code);
        message
    }

    pub fn txt_record(owner: &str, chunks: &[&str]) -> Record {
        let txt = TXT::new(chunks.iter().map(|c| c.to_string()).collect());
        Record::from_rdata(name(owner), 300, RData::TXT(txt))
    }

    /// A root zone key that signs every record it is asked to
    pub struct RootSigner {
        key: KeyPair<Private>,
        dnskey: DNSKEY,
    }

    impl RootSigner {
        pub fn generate() -> Self {
            let pkcs8 = KeyPair::<Private>::generate_pkcs8(Algorithm::ED25519).unwrap();
            let key = KeyFormat::Pkcs8
                .decode_key(&pkcs8, None, Algorithm::ED25519)
                .unwrap();
            let dnskey = key.to_dnskey(Algorithm::ED25519).unwrap();
            Self { key, dnskey }
        }

        /// DS presentation string anchoring this key
        pub fn anchor(&self) -> String {
            let digest = self.dnskey.to_digest(&Name::root(), DigestType::SHA256).unwrap();
            format!(
                ". IN DS {} 15 2 {}",
                self.dnskey.calculate_key_tag().unwrap(),
                hex::encode_upper(digest.as_ref())
            )
        }

        pub fn dnskey_response(&self) -> Message {
            let key = Record::from_rdata(
                Name::root(),
                3600,
                RData::DNSSEC(DNSSECRData::DNSKEY(self.dnskey.clone())),
            );
            self.signed_response(vec![key])
        }

        /// RRSIG over `records`, which share owner, type and class
        pub fn sign(&self, records: &[Record]) -> Record {
            let first = &records[0];
            let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as u32;
            let key_tag = self.dnskey.calculate_key_tag().unwrap();
            let rrsig = |sig: Vec<u8>| {
                RRSIG::new(
                    first.record_type(),
                    Algorithm::ED25519,
                    first.name().num_labels(),
                    first.ttl(),
                    now + 3600,
                    now - 3600,
                    key_tag,
                    Name::root(),
                    sig,
                )
            };

            let tbs = rrset_tbs_with_sig(first.name(), DNSClass::IN, &rrsig(Vec::new()), records).unwrap();
            let signature = self.key.sign(Algorithm::ED25519, &tbs).unwrap();
            Record::from_rdata(
                first.name().clone(),
                first.ttl(),
                RData::DNSSEC(DNSSECRData::RRSIG(rrsig(signature))),
            )
        }

        /// A NOERROR response carrying `records` and their signature
        pub fn signed_response(&self, records: Vec<Record>) -> Message {
            let signature = self.sign(&records);
            let mut message = response(ResponseCode::NoError);
            message.add_answers(records);
            message.add_answer(signature);
            message
        }
    }
}
