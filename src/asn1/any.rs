use crate::error::Error;
use crate::stream::SliceStream;

use super::Tlv;

/// An `ANY` element: the tag and raw content are retained verbatim, without
/// committing to a concrete type at parse time.
///
/// Used for `AlgorithmIdentifier.parameters` (whose shape depends on the
/// algorithm) and `AttributeTypeAndValue.value` (whose shape depends on the
/// attribute type, resolved lazily via [`Any::decode_as`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Any {
    pub tag: u8,
    pub content: Vec<u8>,
}

impl Any {
    pub fn parse(tlv: Tlv) -> Result<Any, Error> {
        Ok(Any {
            tag: tlv.tag,
            content: tlv.content,
        })
    }

    /// Re-runs `decode` over this element's stored TLV, as if it had just
    /// been read from the wire — the mechanism `DirectoryString` decoding
    /// of an `AttributeTypeAndValue.value` uses, since the grammar can't
    /// know the value's concrete alternative until the attribute type OID
    /// is known.
    pub fn decode_as<T>(&self, decode: impl FnOnce(u8, Vec<u8>) -> Result<T, Error>) -> Result<T, Error> {
        decode(self.tag, self.content.clone())
    }

    /// Re-encodes this element in minimal (canonical) BER: tag, a
    /// recomputed length prefix, then the raw content.
    pub fn to_der(&self) -> Vec<u8> {
        encode_tlv(self.tag, &self.content)
    }
}

/// Encodes `tag || canonical_length(content) || content`. Length is always
/// emitted in minimal short/long form; the indefinite form is never
/// produced on output.
pub fn encode_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(tag);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let mut bytes = Vec::new();
    let mut v = len;
    while v > 0 {
        bytes.push((v & 0xFF) as u8);
        v >>= 8;
    }
    bytes.reverse();
    out.push(0x80 | bytes.len() as u8);
    out.extend_from_slice(&bytes);
}

/// Parses a standalone DER buffer as a single TLV (used to decode an
/// `ANY`'s stored content against a concrete template).
pub fn parse_standalone(content: &[u8]) -> Result<Tlv, Error> {
    let mut stream = SliceStream::new(content.to_vec());
    super::read_tlv(&mut stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_short_form_length() {
        let bytes = encode_tlv(0x04, &[1, 2, 3]);
        assert_eq!(bytes, vec![0x04, 0x03, 1, 2, 3]);
    }

    #[test]
    fn encodes_long_form_length() {
        let content = vec![0u8; 200];
        let bytes = encode_tlv(0x04, &content);
        assert_eq!(&bytes[..3], &[0x04, 0x81, 0xC8]);
    }

    #[test]
    fn decode_as_redecodes_stored_content() {
        let any = Any {
            tag: 0x02,
            content: vec![0x05],
        };
        let v: i64 = any
            .decode_as(|_tag, content| {
                super::super::primitives::Integer::parse(content, None)
                    .map(|i| i.as_i64().unwrap())
            })
            .unwrap();
        assert_eq!(v, 5);
    }
}
