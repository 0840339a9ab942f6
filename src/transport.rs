//! The byte-stream transport the scan driver is generic over (§6), plus the
//! two implementations this crate ships: a blocking [`TcpTransport`] and a
//! scriptable [`ScriptedTransport`] for tests.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::Error;

/// The default socket read timeout (§5).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// A byte-stream transport: connect, send, recv, close. The scan driver is
/// generic over this trait rather than tied to `TcpStream`, so it can be
/// driven against a scripted transport in tests without a real socket.
pub trait Transport {
    /// Sends `bytes` in full, or fails.
    fn send(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Reads at least one byte, or fails (including on EOF).
    fn recv(&mut self) -> Result<Vec<u8>, Error>;

    /// Closes the transport. Implementations should be safe to call more
    /// than once.
    fn close(&mut self) -> Result<(), Error>;
}

/// A blocking transport over `std::net::TcpStream`, with a 10s read
/// timeout (§5). `close` happens automatically via `Drop`, but the scan
/// driver still calls it explicitly between iterations, per the "guaranteed
/// close on all exit paths" transport contract (§6).
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Connects to `addr`, applying the default read timeout.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<TcpTransport, Error> {
        Self::connect_with_timeout(addr, DEFAULT_READ_TIMEOUT)
    }

    /// Connects to `addr` with an explicit read timeout.
    pub fn connect_with_timeout(
        addr: impl ToSocketAddrs,
        read_timeout: Duration,
    ) -> Result<TcpTransport, Error> {
        let stream = TcpStream::connect(addr).map_err(Error::transport)?;
        stream
            .set_read_timeout(Some(read_timeout))
            .map_err(Error::transport)?;
        log::debug!("tcp transport connected");
        Ok(TcpTransport { stream: Some(stream) })
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::transport("transport already closed"))?;
        stream.write_all(bytes).map_err(Error::transport)
    }

    fn recv(&mut self) -> Result<Vec<u8>, Error> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::transport("transport already closed"))?;
        let mut buf = [0u8; 8192];
        let n = stream.read(&mut buf).map_err(Error::transport)?;
        if n == 0 {
            return Err(Error::transport("connection closed by peer"));
        }
        Ok(buf[..n].to_vec())
    }

    fn close(&mut self) -> Result<(), Error> {
        if let Some(stream) = self.stream.take() {
            log::trace!("tcp transport closed");
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        Ok(())
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// A transport that replays pre-scripted response chunks and records every
/// byte sent to it, so the record/handshake codec and the scan driver can
/// be exercised without a real socket.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    chunks: std::collections::VecDeque<Vec<u8>>,
    pub sent: Vec<u8>,
    closed: bool,
}

impl ScriptedTransport {
    /// A transport that yields `chunks` in order on successive `recv()`
    /// calls, then fails as if the peer closed the connection.
    pub fn with_chunks(chunks: Vec<Vec<u8>>) -> ScriptedTransport {
        ScriptedTransport {
            chunks: chunks.into(),
            sent: Vec::new(),
            closed: false,
        }
    }

    /// A transport that replays a single response record/payload in one
    /// chunk.
    pub fn with_response(bytes: Vec<u8>) -> ScriptedTransport {
        ScriptedTransport::with_chunks(vec![bytes])
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.closed {
            return Err(Error::transport("transport already closed"));
        }
        self.sent.extend_from_slice(bytes);
        Ok(())
    }

    fn recv(&mut self) -> Result<Vec<u8>, Error> {
        if self.closed {
            return Err(Error::transport("transport already closed"));
        }
        self.chunks
            .pop_front()
            .ok_or_else(|| Error::transport("scripted transport exhausted"))
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_transport_replays_chunks_in_order() {
        let mut t = ScriptedTransport::with_chunks(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(t.recv().unwrap(), vec![1, 2]);
        assert_eq!(t.recv().unwrap(), vec![3, 4]);
        assert!(t.recv().is_err());
    }

    #[test]
    fn scripted_transport_records_sent_bytes() {
        let mut t = ScriptedTransport::default();
        t.send(&[0xAA, 0xBB]).unwrap();
        t.send(&[0xCC]).unwrap();
        assert_eq!(t.sent, vec![0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn closed_transport_rejects_further_calls() {
        let mut t = ScriptedTransport::with_response(vec![1]);
        t.close().unwrap();
        assert!(t.send(&[1]).is_err());
        assert!(t.recv().is_err());
    }
}
