//! Handshake sub-record encoders/decoders (§4.E).
//!
//! `ClientHello` is the only message this crate ever builds; the rest are
//! decode-only, since the scanner never progresses the handshake past
//! reading the server's opening flight.

use crate::error::Error;
use crate::registry::{CipherSuiteRegistry, CompressionMethodRegistry};
use crate::tls::extension::Extension;
use crate::tls::version::{read_version, ProtocolVersion};

const RANDOM_LEN: usize = 28;

/// `Handshake.msg_type` values (RFC 5246 §7.4).
pub mod msg_type {
    pub const CLIENT_HELLO: u8 = 0x01;
    pub const SERVER_HELLO: u8 = 0x02;
    pub const CERTIFICATE: u8 = 0x0B;
    pub const SERVER_KEY_EXCHANGE: u8 = 0x0C;
    pub const CERTIFICATE_REQUEST: u8 = 0x0D;
    pub const SERVER_HELLO_DONE: u8 = 0x0E;
}

/// A single cipher suite as it appears in a ClientHello/ServerHello, before
/// registry resolution.
pub type CipherSuiteId = [u8; 2];

/// The `ClientHello` handshake message this crate builds.
#[derive(Debug, Clone)]
pub struct ClientHello {
    pub version: ProtocolVersion,
    pub timestamp: u32,
    pub random: [u8; RANDOM_LEN],
    pub session_id: Vec<u8>,
    pub cipher_suites: Vec<CipherSuiteId>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<Extension>,
}

impl ClientHello {
    /// Encodes the fixed-field layout described in §4.E.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.version.to_wire());
        body.extend_from_slice(&self.timestamp.to_be_bytes());
        body.extend_from_slice(&self.random);
        body.push(self.session_id.len() as u8);
        body.extend_from_slice(&self.session_id);

        let cs_bytes: Vec<u8> = self.cipher_suites.iter().flat_map(|id| *id).collect();
        body.extend_from_slice(&(cs_bytes.len() as u16).to_be_bytes());
        body.extend_from_slice(&cs_bytes);

        body.push(self.compression_methods.len() as u8);
        body.extend_from_slice(&self.compression_methods);

        let ext_bytes: Vec<u8> = self.extensions.iter().flat_map(Extension::encode).collect();
        body.extend_from_slice(&(ext_bytes.len() as u16).to_be_bytes());
        body.extend_from_slice(&ext_bytes);

        body
    }

    /// Decodes a ClientHello body, mirroring [`ClientHello::encode`]. Used
    /// only by the round-trip test in §8; the scanner itself never receives
    /// a ClientHello.
    pub fn decode(body: &[u8]) -> Result<ClientHello, Error> {
        if body.len() < 2 + 4 + RANDOM_LEN + 1 {
            return Err(Error::parse("ClientHello body too short"));
        }
        let mut pos = 0;
        let version = read_version(&body[0..2])?;
        pos += 2;
        let timestamp = u32::from_be_bytes(body[pos..pos + 4].try_into().unwrap());
        pos += 4;
        let mut random = [0u8; RANDOM_LEN];
        random.copy_from_slice(&body[pos..pos + RANDOM_LEN]);
        pos += RANDOM_LEN;

        let sid_len = body[pos] as usize;
        pos += 1;
        let session_id = take(body, &mut pos, sid_len, "session_id")?.to_vec();

        let cs_len = u16::from_be_bytes(take2(body, &mut pos, "cipher suite list length")?) as usize;
        if cs_len % 2 != 0 {
            return Err(Error::parse("cipher suite list length must be even"));
        }
        let cs_bytes = take(body, &mut pos, cs_len, "cipher_suites")?;
        let cipher_suites: Vec<CipherSuiteId> =
            cs_bytes.chunks_exact(2).map(|c| [c[0], c[1]]).collect();

        let cm_len = take(body, &mut pos, 1, "compression method count")?[0] as usize;
        let compression_methods = take(body, &mut pos, cm_len, "compression_methods")?.to_vec();

        let mut extensions = Vec::new();
        if pos + 2 <= body.len() {
            let ext_len = u16::from_be_bytes(take2(body, &mut pos, "extensions length")?) as usize;
            let ext_bytes = take(body, &mut pos, ext_len, "extensions")?;
            extensions = Extension::decode_all(ext_bytes)?;
        }

        Ok(ClientHello {
            version,
            timestamp,
            random,
            session_id,
            cipher_suites,
            compression_methods,
            extensions,
        })
    }
}

/// The server's reply to a ClientHello.
#[derive(Debug, Clone)]
pub struct ServerHello {
    pub version: ProtocolVersion,
    pub timestamp: u32,
    pub random: [u8; RANDOM_LEN],
    pub session_id: Vec<u8>,
    pub cipher_suite: CipherSuiteId,
    pub compression_method: u8,
    pub extensions: Vec<Extension>,
}

impl ServerHello {
    pub fn decode(body: &[u8]) -> Result<ServerHello, Error> {
        if body.len() < 2 + 4 + RANDOM_LEN + 1 {
            return Err(Error::parse("ServerHello body too short"));
        }
        let mut pos = 0;
        let version = read_version(&body[0..2])?;
        pos += 2;
        let timestamp = u32::from_be_bytes(body[pos..pos + 4].try_into().unwrap());
        pos += 4;
        let mut random = [0u8; RANDOM_LEN];
        random.copy_from_slice(&body[pos..pos + RANDOM_LEN]);
        pos += RANDOM_LEN;

        let sid_len = body[pos] as usize;
        pos += 1;
        let session_id = take(body, &mut pos, sid_len, "session_id")?.to_vec();

        let cs = take2(body, &mut pos, "cipher_suite")?;
        let cm = take(body, &mut pos, 1, "compression_method")?[0];

        let mut extensions = Vec::new();
        if pos + 2 <= body.len() {
            let ext_len = u16::from_be_bytes(take2(body, &mut pos, "extensions length")?) as usize;
            let ext_bytes = take(body, &mut pos, ext_len, "extensions")?;
            extensions = Extension::decode_all(ext_bytes)?;
        }

        Ok(ServerHello {
            version,
            timestamp,
            random,
            session_id,
            cipher_suite: cs,
            compression_method: cm,
            extensions,
        })
    }

    /// Resolves the chosen cipher suite against the global registry.
    pub fn resolved_cipher_suite(&self) -> crate::registry::CipherSuite {
        CipherSuiteRegistry::global().resolve(self.cipher_suite)
    }

    /// Resolves the chosen compression method against the global registry.
    ///
    /// The distilled source checks this field's type against
    /// `TLS_CipherSuite` rather than `TLS_CompressionMethod` — a bug (see
    /// design notes); this implementation resolves against the correct
    /// registry.
    pub fn resolved_compression_method(&self) -> crate::registry::CompressionMethod {
        CompressionMethodRegistry::global().resolve(self.compression_method)
    }
}

/// `Certificate` handshake message: an ordered chain of raw DER blobs.
#[derive(Debug, Clone, Default)]
pub struct CertificateMessage {
    pub certificates: Vec<Vec<u8>>,
}

impl CertificateMessage {
    /// `certificate_list_len` (u24) | one or more `{u24 len, len bytes}` entries.
    pub fn decode(body: &[u8]) -> Result<CertificateMessage, Error> {
        let mut pos = 0;
        let list_len_bytes = take(body, &mut pos, 3, "certificate_list length")?;
        let list_len = u32::from_be_bytes([0, list_len_bytes[0], list_len_bytes[1], list_len_bytes[2]]) as usize;
        if pos + list_len != body.len() {
            return Err(Error::parse("certificate_list length does not match body length"));
        }

        let mut certificates = Vec::new();
        while pos < body.len() {
            let len_bytes = take(body, &mut pos, 3, "certificate length")?;
            let len = u32::from_be_bytes([0, len_bytes[0], len_bytes[1], len_bytes[2]]) as usize;
            let der = take(body, &mut pos, len, "certificate")?.to_vec();
            certificates.push(der);
        }
        Ok(CertificateMessage { certificates })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut entries = Vec::new();
        for der in &self.certificates {
            let len = (der.len() as u32).to_be_bytes();
            entries.extend_from_slice(&len[1..]);
            entries.extend_from_slice(der);
        }
        let mut out = Vec::with_capacity(3 + entries.len());
        let list_len = (entries.len() as u32).to_be_bytes();
        out.extend_from_slice(&list_len[1..]);
        out.extend_from_slice(&entries);
        out
    }
}

/// A decoded handshake sub-record.
#[derive(Debug, Clone)]
pub enum HandshakeMessage {
    ClientHello(ClientHello),
    ServerHello(ServerHello),
    Certificate(CertificateMessage),
    /// `ServerKeyExchange` / `CertificateRequest`: accepted with opaque
    /// payload, per §4.E — the scan never needs their contents.
    Opaque { msg_type: u8, body: Vec<u8> },
    ServerHelloDone,
}

impl HandshakeMessage {
    /// Decodes one handshake sub-record: 1-byte type, 3-byte big-endian
    /// length, then the body. Returns the message and the number of bytes
    /// consumed from `buf`, so callers can walk multiple sub-records packed
    /// into one record.
    pub fn decode_one(buf: &[u8]) -> Result<(HandshakeMessage, usize), Error> {
        if buf.len() < 4 {
            return Err(Error::parse("truncated handshake header"));
        }
        let msg_type = buf[0];
        let len = u32::from_be_bytes([0, buf[1], buf[2], buf[3]]) as usize;
        if buf.len() < 4 + len {
            return Err(Error::parse("truncated handshake body"));
        }
        let body = &buf[4..4 + len];
        let message = match msg_type {
            msg_type::CLIENT_HELLO => HandshakeMessage::ClientHello(ClientHello::decode(body)?),
            msg_type::SERVER_HELLO => HandshakeMessage::ServerHello(ServerHello::decode(body)?),
            msg_type::CERTIFICATE => HandshakeMessage::Certificate(CertificateMessage::decode(body)?),
            msg_type::SERVER_KEY_EXCHANGE | msg_type::CERTIFICATE_REQUEST => HandshakeMessage::Opaque {
                msg_type,
                body: body.to_vec(),
            },
            msg_type::SERVER_HELLO_DONE => {
                if !body.is_empty() {
                    return Err(Error::parse("ServerHelloDone must have zero-length body"));
                }
                HandshakeMessage::ServerHelloDone
            }
            other => {
                return Err(Error::protocol(format!(
                    "unexpected handshake message type {other:#04x}"
                )))
            }
        };
        Ok((message, 4 + len))
    }

    /// Encodes a `ClientHello`; any other variant is [`Error::not_implemented`]
    /// since this crate never needs to serialize the others.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        match self {
            HandshakeMessage::ClientHello(ch) => {
                let body = ch.encode();
                Ok(frame(msg_type::CLIENT_HELLO, &body))
            }
            other => Err(Error::not_implemented(format!("cannot serialize {other:?}"))),
        }
    }
}

fn frame(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    out.push(msg_type);
    let len = (body.len() as u32).to_be_bytes();
    out.extend_from_slice(&len[1..]);
    out.extend_from_slice(body);
    out
}

fn take<'a>(buf: &'a [u8], pos: &mut usize, n: usize, what: &str) -> Result<&'a [u8], Error> {
    if *pos + n > buf.len() {
        return Err(Error::parse(format!("truncated {what}")));
    }
    let out = &buf[*pos..*pos + n];
    *pos += n;
    Ok(out)
}

fn take2(buf: &[u8], pos: &mut usize, what: &str) -> Result<[u8; 2], Error> {
    let s = take(buf, pos, 2, what)?;
    Ok([s[0], s[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client_hello() -> ClientHello {
        ClientHello {
            version: ProtocolVersion::TLS_1_2,
            timestamp: 0,
            random: [0u8; RANDOM_LEN],
            session_id: Vec::new(),
            cipher_suites: vec![[0x00, 0x2F]],
            compression_methods: vec![0x00],
            extensions: Vec::new(),
        }
    }

    #[test]
    fn client_hello_round_trips() {
        let ch = sample_client_hello();
        let encoded = ch.encode();
        let decoded = ClientHello::decode(&encoded).unwrap();
        assert_eq!(decoded.version, ch.version);
        assert_eq!(decoded.timestamp, ch.timestamp);
        assert_eq!(decoded.random, ch.random);
        assert_eq!(decoded.cipher_suites, ch.cipher_suites);
        assert_eq!(decoded.compression_methods, ch.compression_methods);
    }

    #[test]
    fn server_hello_done_has_empty_body() {
        let buf = [msg_type::SERVER_HELLO_DONE, 0x00, 0x00, 0x00];
        let (msg, consumed) = HandshakeMessage::decode_one(&buf).unwrap();
        assert!(matches!(msg, HandshakeMessage::ServerHelloDone));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn certificate_message_round_trips() {
        let cm = CertificateMessage {
            certificates: vec![vec![1, 2, 3], vec![4, 5]],
        };
        let encoded = cm.encode();
        let decoded = CertificateMessage::decode(&encoded).unwrap();
        assert_eq!(decoded.certificates, cm.certificates);
    }

    #[test]
    fn unknown_handshake_type_is_a_protocol_error() {
        let buf = [0x99, 0x00, 0x00, 0x00];
        let err = HandshakeMessage::decode_one(&buf).unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn serializing_server_hello_is_not_implemented() {
        let msg = HandshakeMessage::ServerHelloDone;
        let err = msg.encode().unwrap_err();
        assert!(err.is_not_implemented());
    }
}
