use super::Stream;

/// A transparent pass-through that appends every delivered byte to an
/// internal log.
///
/// Wrapped around a [`Bounded`](super::Bounded) sub-stream immediately after
/// a TLV length is read, this is how the ASN.1 engine recovers the exact
/// to-be-signed bytes of a `tbsCertificate`: run the content parser through
/// this overlay, then call [`drain_to_end`](Recording::drain_to_end) so the
/// log ends up holding every content octet regardless of how much the
/// parser itself consumed.
pub struct Recording<'s> {
    inner: &'s mut dyn Stream,
    log: Vec<u8>,
}

impl<'s> Recording<'s> {
    pub fn new(inner: &'s mut dyn Stream) -> Self {
        Recording {
            inner,
            log: Vec::new(),
        }
    }

    /// The bytes delivered through this overlay so far.
    pub fn log(&self) -> &[u8] {
        &self.log
    }

    /// Consumes the overlay, returning the accumulated log.
    pub fn into_log(self) -> Vec<u8> {
        self.log
    }

    /// Reads and logs whatever bytes remain on the inner stream, so the log
    /// ends up holding every content octet even if the content parser
    /// stopped short of the declared length.
    pub fn drain_to_end(&mut self) {
        while self.has_more() {
            if self.read_n(8192).is_none() {
                break;
            }
        }
    }
}

impl Stream for Recording<'_> {
    fn read_one(&mut self) -> Option<u8> {
        let b = self.inner.read_one();
        if let Some(byte) = b {
            self.log.push(byte);
        }
        b
    }

    fn read_n(&mut self, n: usize) -> Option<Vec<u8>> {
        let out = self.inner.read_n(n);
        if let Some(ref bytes) = out {
            self.log.extend_from_slice(bytes);
        }
        out
    }

    fn remaining_hint(&self) -> Option<usize> {
        self.inner.remaining_hint()
    }

    fn has_more(&mut self) -> bool {
        self.inner.has_more()
    }
}
