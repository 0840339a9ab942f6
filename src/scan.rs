//! The scan driver (§4.F): drives one partial TLS handshake per transport
//! and exposes what the peer chose, plus the three probes built on top of
//! it (cipher-suite enumeration, honor-order, certificate fetch).

use rand::RngCore;

use crate::error::Error;
use crate::registry::{CipherSuite, CipherSuiteRegistry, CompressionMethod, CompressionMethodRegistry};
use crate::tls::{
    CertificateMessage, ClientHello, Extension, HandshakeMessage, ProtocolVersion, Record, RecordReader,
};
use crate::transport::Transport;

/// Drives a single handshake attempt: sends a ClientHello built from the
/// current candidates, then reads records until `ServerHelloDone` or a
/// fatal condition, recording whatever the server chose along the way.
#[derive(Debug)]
pub struct ScanSession {
    client_version: ProtocolVersion,
    cipher_suites: Vec<[u8; 2]>,
    compression_methods: Vec<u8>,
    extensions: Vec<Extension>,

    server_version: Option<ProtocolVersion>,
    chosen_cipher_suite: Option<CipherSuite>,
    chosen_compression_method: Option<CompressionMethod>,
    server_certificates: Vec<Vec<u8>>,
}

impl Default for ScanSession {
    /// Starts from every registered cipher suite and the `NULL` compression
    /// method, the broadest candidate set the cipher-listing probe needs.
    fn default() -> ScanSession {
        ScanSession {
            client_version: ProtocolVersion::TLS_1_2,
            cipher_suites: CipherSuiteRegistry::global().all().iter().map(|s| s.id).collect(),
            compression_methods: vec![0x00],
            extensions: Vec::new(),
            server_version: None,
            chosen_cipher_suite: None,
            chosen_compression_method: None,
            server_certificates: Vec::new(),
        }
    }
}

impl ScanSession {
    pub fn new() -> ScanSession {
        ScanSession::default()
    }

    pub fn set_client_version(&mut self, version: ProtocolVersion) -> &mut Self {
        self.client_version = version;
        self
    }

    pub fn set_available_cipher_suites(&mut self, suites: Vec<[u8; 2]>) -> &mut Self {
        self.cipher_suites = suites;
        self
    }

    pub fn set_available_compression_methods(&mut self, methods: Vec<u8>) -> &mut Self {
        self.compression_methods = methods;
        self
    }

    /// SNI is the only extension this crate's ClientHello builder supports
    /// (§4.F).
    pub fn set_available_extensions(&mut self, extensions: Vec<Extension>) -> &mut Self {
        self.extensions = extensions;
        self
    }

    /// Sends a ClientHello over `transport`, then reads records until
    /// `ServerHelloDone` (success) or an alert/transport failure.
    pub fn connect(&mut self, transport: &mut dyn Transport) -> Result<(), Error> {
        let hello = self.build_client_hello();
        let record =
            Record::encode_client_hello(self.client_version, &HandshakeMessage::ClientHello(hello))?;
        transport.send(&record)?;

        let mut reader = RecordReader::new(transport);
        loop {
            match reader.next_record()? {
                Record::Alert { level, description } => return Err(Error::alert(level, description)),
                Record::Handshake(messages) => {
                    for message in messages {
                        match message {
                            HandshakeMessage::ServerHello(server_hello) => {
                                self.server_version = Some(server_hello.version);
                                self.chosen_cipher_suite = Some(server_hello.resolved_cipher_suite());
                                self.chosen_compression_method =
                                    Some(server_hello.resolved_compression_method());
                            }
                            HandshakeMessage::Certificate(CertificateMessage { certificates }) => {
                                self.server_certificates = certificates;
                            }
                            HandshakeMessage::ServerHelloDone => return Ok(()),
                            // ServerKeyExchange / CertificateRequest / a
                            // stray ClientHello: nothing this driver reads.
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    pub fn chosen_cipher_suite(&self) -> Option<&CipherSuite> {
        self.chosen_cipher_suite.as_ref()
    }

    pub fn chosen_compression_method(&self) -> Option<&CompressionMethod> {
        self.chosen_compression_method.as_ref()
    }

    pub fn server_version(&self) -> Option<ProtocolVersion> {
        self.server_version
    }

    pub fn server_certificates(&self) -> &[Vec<u8>] {
        &self.server_certificates
    }

    fn build_client_hello(&self) -> ClientHello {
        let mut rng = rand::thread_rng();
        let mut random = [0u8; 28];
        rng.fill_bytes(&mut random);
        ClientHello {
            version: self.client_version,
            timestamp: rng.next_u32(),
            random,
            session_id: Vec::new(),
            cipher_suites: self.cipher_suites.clone(),
            compression_methods: self.compression_methods.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

/// The result of [`probe_honor_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HonorOrder {
    /// The server always returns its own top preference, regardless of the
    /// order the client lists candidates in.
    Server,
    /// The server simply picks whichever candidate the client listed first.
    Client,
    /// Neither pattern held (or there weren't enough candidates to tell).
    Indeterminate,
}

/// Enumerates every cipher suite the peer accepts (§4.F). Opens a fresh
/// transport per iteration via `open`, offering a shrinking candidate list
/// until the peer replies `handshake_failure` ("no remaining candidate is
/// acceptable") or the candidate set is exhausted. Any other alert aborts
/// the scan for this protocol version.
pub fn enumerate_cipher_suites(
    mut open: impl FnMut() -> Result<Box<dyn Transport>, Error>,
    client_version: ProtocolVersion,
) -> Result<Vec<CipherSuite>, Error> {
    let mut candidates: Vec<[u8; 2]> = CipherSuiteRegistry::global().all().iter().map(|s| s.id).collect();
    let mut chosen = Vec::new();

    while !candidates.is_empty() {
        let mut transport = open()?;
        let mut session = ScanSession::new();
        session.set_client_version(client_version);
        session.set_available_cipher_suites(candidates.clone());

        let result = session.connect(transport.as_mut());
        transport.close()?;

        match result {
            Ok(()) => {
                let suite = session.chosen_cipher_suite().cloned().ok_or_else(|| {
                    Error::protocol("ServerHelloDone reached without a ServerHello")
                })?;
                candidates.retain(|id| *id != suite.id);
                chosen.push(suite);
            }
            Err(e) if e.is_handshake_failure() => break,
            Err(e) => return Err(e),
        }
    }

    Ok(chosen)
}

/// Given the order cipher suites were enumerated in (`[c₀, …, c_{n-1}]`),
/// issues one more handshake offering `[c_{n-1}, c₀, …, c_{n-2}]` — the
/// last-enumerated suite moved to the front — to distinguish a server that
/// honors its own preference order from one that just takes the client's
/// first offer (§4.F).
pub fn probe_honor_order(
    mut open: impl FnMut() -> Result<Box<dyn Transport>, Error>,
    client_version: ProtocolVersion,
    enumerated: &[CipherSuite],
) -> Result<HonorOrder, Error> {
    if enumerated.len() < 2 {
        return Ok(HonorOrder::Indeterminate);
    }
    let first = enumerated[0].id;
    let last = enumerated[enumerated.len() - 1].id;

    let mut reordered = vec![last];
    reordered.extend(enumerated[..enumerated.len() - 1].iter().map(|s| s.id));

    let mut transport = open()?;
    let mut session = ScanSession::new();
    session.set_client_version(client_version);
    session.set_available_cipher_suites(reordered);
    session.connect(transport.as_mut())?;
    transport.close()?;

    let chosen = session
        .chosen_cipher_suite()
        .ok_or_else(|| Error::protocol("ServerHelloDone reached without a ServerHello"))?;

    Ok(if chosen.id == first {
        HonorOrder::Server
    } else if chosen.id == last {
        HonorOrder::Client
    } else {
        HonorOrder::Indeterminate
    })
}

/// One handshake against the full candidate list — optionally with SNI set
/// to `sni_hostname` — returning the server's certificate chain as raw DER
/// blobs on success (§4.F).
pub fn probe_certificates(
    transport: &mut dyn Transport,
    client_version: ProtocolVersion,
    sni_hostname: Option<&str>,
) -> Result<Vec<Vec<u8>>, Error> {
    let mut session = ScanSession::new();
    session.set_client_version(client_version);
    if let Some(host) = sni_hostname {
        session.set_available_extensions(vec![Extension::server_name(host)]);
    }
    session.connect(transport)?;
    Ok(session.server_certificates().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ScriptedTransport;

    fn frame(msg_type: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![msg_type];
        out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        out.extend_from_slice(body);
        out
    }

    fn handshake_record(payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0x16, 0x03, 0x03];
        out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn server_hello_body(cipher_suite: [u8; 2]) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&[0x03, 0x03]);
        b.extend_from_slice(&[0, 0, 0, 0]);
        b.extend_from_slice(&[0u8; 28]);
        b.push(0);
        b.extend_from_slice(&cipher_suite);
        b.push(0x00);
        b
    }

    fn scripted_hello_and_done(cipher_suite: [u8; 2]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&frame(0x02, &server_hello_body(cipher_suite)));
        payload.extend_from_slice(&frame(0x0E, &[]));
        handshake_record(&payload)
    }

    #[test]
    fn connect_reads_server_hello_and_server_hello_done() {
        let record = scripted_hello_and_done([0x00, 0x2F]);
        let mut transport = ScriptedTransport::with_response(record);
        let mut session = ScanSession::new();
        session.connect(&mut transport).unwrap();

        assert_eq!(session.server_version(), Some(ProtocolVersion::TLS_1_2));
        assert_eq!(
            session.chosen_cipher_suite().unwrap().name,
            "TLS_RSA_WITH_AES_128_CBC_SHA"
        );
    }

    #[test]
    fn connect_surfaces_alerts_as_errors() {
        let alert = vec![0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];
        let mut transport = ScriptedTransport::with_response(alert);
        let mut session = ScanSession::new();
        let err = session.connect(&mut transport).unwrap_err();
        assert!(err.is_handshake_failure());
    }

    #[test]
    fn enumeration_stops_at_first_handshake_failure() {
        let alert = vec![0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];
        let mut calls = 0;
        let result = enumerate_cipher_suites(
            || {
                calls += 1;
                Ok(Box::new(ScriptedTransport::with_response(alert.clone())) as Box<dyn Transport>)
            },
            ProtocolVersion::TLS_1_2,
        )
        .unwrap();
        assert!(result.is_empty());
        assert_eq!(calls, 1);
    }

    #[test]
    fn honor_order_detects_server_preference() {
        let suite_a = CipherSuiteRegistry::global().resolve([0x00, 0x2F]);
        let suite_b = CipherSuiteRegistry::global().resolve([0x00, 0x35]);
        let enumerated = vec![suite_a.clone(), suite_b.clone()];

        let record = scripted_hello_and_done(suite_a.id);
        let result = probe_honor_order(
            || Ok(Box::new(ScriptedTransport::with_response(record.clone())) as Box<dyn Transport>),
            ProtocolVersion::TLS_1_2,
            &enumerated,
        )
        .unwrap();
        assert_eq!(result, HonorOrder::Server);
    }

    #[test]
    fn honor_order_is_indeterminate_with_one_candidate() {
        let suite_a = CipherSuiteRegistry::global().resolve([0x00, 0x2F]);
        let result = probe_honor_order(
            || unreachable!("no handshake should be attempted"),
            ProtocolVersion::TLS_1_2,
            &[suite_a],
        )
        .unwrap();
        assert_eq!(result, HonorOrder::Indeterminate);
    }

    #[test]
    fn certificate_probe_returns_the_chain() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&frame(0x02, &server_hello_body([0x00, 0x2F])));
        payload.extend_from_slice(&frame(0x0B, &CertificateMessage { certificates: vec![vec![1, 2, 3]] }.encode()));
        payload.extend_from_slice(&frame(0x0E, &[]));
        let record = handshake_record(&payload);

        let mut transport = ScriptedTransport::with_response(record);
        let chain = probe_certificates(&mut transport, ProtocolVersion::TLS_1_2, Some("example.org")).unwrap();
        assert_eq!(chain, vec![vec![1, 2, 3]]);
    }
}
