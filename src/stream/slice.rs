use super::Stream;

/// A stream over an owned in-memory buffer, tracking a read cursor.
#[derive(Debug, Clone)]
pub struct SliceStream {
    buf: Vec<u8>,
    pos: usize,
}

impl SliceStream {
    /// Wraps `buf` for sequential reading starting at offset 0.
    pub fn new(buf: impl Into<Vec<u8>>) -> Self {
        SliceStream {
            buf: buf.into(),
            pos: 0,
        }
    }

    /// The current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Stream for SliceStream {
    fn read_one(&mut self) -> Option<u8> {
        let b = self.buf.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn read_n(&mut self, n: usize) -> Option<Vec<u8>> {
        if self.pos >= self.buf.len() {
            return if n == 0 { Some(Vec::new()) } else { None };
        }
        let end = (self.pos + n).min(self.buf.len());
        let out = self.buf[self.pos..end].to_vec();
        self.pos = end;
        Some(out)
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.buf.len().saturating_sub(self.pos))
    }

    fn has_more(&mut self) -> bool {
        self.pos < self.buf.len()
    }
}
