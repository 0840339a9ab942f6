//! TLS record/handshake wire codec (§4.E) and the scan driver that sits on
//! top of it (§4.F, in [`crate::scan`]).

mod alert;
mod extension;
mod handshake;
mod record;
mod version;

pub use alert::{AlertDescription, AlertLevel};
pub use extension::Extension;
pub use handshake::{CertificateMessage, ClientHello, HandshakeMessage, ServerHello};
pub use record::{content_type, Record};
pub use version::ProtocolVersion;

use crate::error::Error;
use crate::transport::Transport;

/// Buffers bytes read from a [`Transport`] and peels off complete
/// [`Record`]s, reading more only when the buffered bytes don't yet cover a
/// full header + payload.
pub struct RecordReader<'t> {
    transport: &'t mut dyn Transport,
    buf: Vec<u8>,
}

impl<'t> RecordReader<'t> {
    pub fn new(transport: &'t mut dyn Transport) -> RecordReader<'t> {
        RecordReader {
            transport,
            buf: Vec::new(),
        }
    }

    /// Reads and returns the next complete record, pulling more bytes from
    /// the transport as needed.
    pub fn next_record(&mut self) -> Result<Record, Error> {
        loop {
            match Record::decode_one(&self.buf) {
                Ok((record, consumed)) => {
                    self.buf.drain(..consumed);
                    return Ok(record);
                }
                Err(_) if self.buf.len() < 5 || self.buf_needs_more() => {
                    let chunk = self.transport.recv()?;
                    self.buf.extend_from_slice(&chunk);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn buf_needs_more(&self) -> bool {
        if self.buf.len() < 5 {
            return true;
        }
        let len = u16::from_be_bytes([self.buf[3], self.buf[4]]) as usize;
        self.buf.len() < 5 + len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ScriptedTransport;

    #[test]
    fn record_reader_assembles_a_record_split_across_reads() {
        let full = vec![0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];
        let mut transport = ScriptedTransport::with_chunks(vec![full[..3].to_vec(), full[3..].to_vec()]);
        let mut reader = RecordReader::new(&mut transport);
        let record = reader.next_record().unwrap();
        assert!(matches!(
            record,
            Record::Alert {
                level: AlertLevel::Fatal,
                description: AlertDescription::HandshakeFailure
            }
        ));
    }
}
