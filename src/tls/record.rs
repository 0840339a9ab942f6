//! Record framing: tag (1) | version (2) | length (2, big-endian) | payload.

use crate::error::Error;
use crate::tls::alert::{AlertDescription, AlertLevel};
use crate::tls::handshake::HandshakeMessage;
use crate::tls::version::{read_version, ProtocolVersion};

/// Outer record content-type tags this crate cares about (RFC 5246 §6.2.1).
pub mod content_type {
    pub const ALERT: u8 = 0x15;
    pub const HANDSHAKE: u8 = 0x16;
}

/// A decoded TLS record. One record may pack multiple handshake messages.
#[derive(Debug, Clone)]
pub enum Record {
    Alert {
        level: AlertLevel,
        description: AlertDescription,
    },
    Handshake(Vec<HandshakeMessage>),
}

impl Record {
    /// Reads one record header + payload from `buf`, returning the decoded
    /// record and the number of bytes consumed.
    pub fn decode_one(buf: &[u8]) -> Result<(Record, usize), Error> {
        if buf.len() < 5 {
            return Err(Error::parse("truncated record header"));
        }
        let content_type = buf[0];
        let _version = read_version(&buf[1..3])?;
        let len = u16::from_be_bytes([buf[3], buf[4]]) as usize;
        if buf.len() < 5 + len {
            return Err(Error::parse("truncated record payload"));
        }
        let payload = &buf[5..5 + len];

        let record = match content_type {
            content_type::ALERT => {
                if payload.len() != 2 {
                    return Err(Error::parse("Alert payload must be exactly 2 bytes"));
                }
                Record::Alert {
                    level: AlertLevel::from_wire(payload[0])?,
                    description: AlertDescription::from_wire(payload[1]),
                }
            }
            content_type::HANDSHAKE => {
                if payload.is_empty() {
                    return Err(Error::protocol("Handshake record contains no messages"));
                }
                let mut messages = Vec::new();
                let mut pos = 0;
                while pos < payload.len() {
                    let (msg, consumed) = HandshakeMessage::decode_one(&payload[pos..])?;
                    messages.push(msg);
                    pos += consumed;
                }
                Record::Handshake(messages)
            }
            other => {
                return Err(Error::protocol(format!("unsupported record content type {other:#04x}")))
            }
        };

        Ok((record, 5 + len))
    }

    /// Encodes a Handshake record carrying a single `ClientHello`.
    pub fn encode_client_hello(version: ProtocolVersion, message: &HandshakeMessage) -> Result<Vec<u8>, Error> {
        let body = message.encode()?;
        let mut out = Vec::with_capacity(5 + body.len());
        out.push(content_type::HANDSHAKE);
        out.extend_from_slice(&version.to_wire());
        out.extend_from_slice(&(body.len() as u16).to_be_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::handshake::ClientHello;

    #[test]
    fn decodes_fatal_handshake_failure_alert() {
        let buf = [0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];
        let (record, consumed) = Record::decode_one(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        match record {
            Record::Alert { level, description } => {
                assert_eq!(level, AlertLevel::Fatal);
                assert_eq!(description, AlertDescription::HandshakeFailure);
            }
            _ => panic!("expected an Alert record"),
        }
    }

    #[test]
    fn handshake_record_with_no_messages_is_a_protocol_error() {
        let buf = [0x16, 0x03, 0x03, 0x00, 0x00];
        let err = Record::decode_one(&buf).unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn encodes_client_hello_record() {
        let ch = ClientHello {
            version: ProtocolVersion::TLS_1_2,
            timestamp: 0,
            random: [0u8; 28],
            session_id: Vec::new(),
            cipher_suites: vec![[0x00, 0x2F]],
            compression_methods: vec![0x00],
            extensions: Vec::new(),
        };
        let record = Record::encode_client_hello(
            ProtocolVersion::TLS_1_0,
            &HandshakeMessage::ClientHello(ch),
        )
        .unwrap();
        assert_eq!(record[0], content_type::HANDSHAKE);
        assert_eq!(&record[1..3], &[0x03, 0x01]);
    }
}
