use super::Stream;

/// A declared-length (or indefinite) sub-range over another stream.
///
/// `len = None` means "unknown / indefinite": `has_more` defers to the
/// underlying stream's own EOF rather than a byte count.
pub struct Bounded<'s> {
    inner: &'s mut dyn Stream,
    len: Option<usize>,
    consumed: usize,
}

impl<'s> Bounded<'s> {
    /// Wraps `inner`, limiting reads to `len` bytes (or unbounded if `None`).
    pub fn new(inner: &'s mut dyn Stream, len: Option<usize>) -> Self {
        Bounded {
            inner,
            len,
            consumed: 0,
        }
    }

    /// Bytes still permitted to be read, or `None` if indefinite.
    pub fn remaining(&self) -> Option<usize> {
        self.len.map(|l| l.saturating_sub(self.consumed))
    }

    /// Reads and discards whatever bytes remain, so a recording overlay
    /// wrapped around this sub-stream captures every content octet even if
    /// the inner content parser stopped short.
    pub fn skip_to_end(&mut self) {
        loop {
            let chunk = match self.remaining() {
                Some(0) => break,
                Some(r) => r.min(8192),
                None => {
                    if !self.has_more() {
                        break;
                    }
                    8192
                }
            };
            if self.read_n(chunk).is_none() {
                break;
            }
        }
    }
}

impl Stream for Bounded<'_> {
    fn read_one(&mut self) -> Option<u8> {
        if let Some(0) = self.remaining() {
            return None;
        }
        let b = self.inner.read_one();
        if b.is_some() {
            self.consumed += 1;
        }
        b
    }

    fn read_n(&mut self, n: usize) -> Option<Vec<u8>> {
        let capped = match self.remaining() {
            Some(r) => n.min(r),
            None => n,
        };
        if capped == 0 {
            return if n == 0 { Some(Vec::new()) } else { None };
        }
        let out = self.inner.read_n(capped);
        if let Some(ref bytes) = out {
            self.consumed += bytes.len();
        }
        out
    }

    fn remaining_hint(&self) -> Option<usize> {
        self.remaining()
    }

    fn has_more(&mut self) -> bool {
        match self.len {
            Some(l) => self.consumed < l,
            None => self.inner.has_more(),
        }
    }
}
