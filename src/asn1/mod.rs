//! A small BER/DER engine: tag/length decoding, a schema-driven SEQUENCE
//! reader, and the primitive element types needed by the X.509 grammar
//! (§`crate::x509`).
//!
//! The engine does not build a parse tree up front. Each grammar production
//! owns a `parse` function that pulls [`Tlv`]s off a [`Stream`] as it goes,
//! using [`SequenceReader`] for named/optional fields and [`parse_repeated`]
//! for `SEQUENCE OF` / `SET OF`.

mod any;
mod oid;
mod primitives;
mod strings;
mod time;

pub use any::Any;
pub use oid::{well_known as oid_table, ObjectIdentifier};
pub use primitives::{parse_boolean, parse_null, BitString, Integer};
pub use strings::{parse_by_tag as strings_parse_by_tag, DirectoryString};
pub use time::Asn1Time;

/// Resolves a dotted-decimal OID to its registered short name (`CN`,
/// `rsaEncryption`, …), if known.
pub fn well_known_oid_name(oid: &ObjectIdentifier) -> Option<&'static str> {
    oid_table::resolve(oid)
}

use crate::error::Error;
use crate::stream::{Markable, Stream, MAX_INDEFINITE_LENGTH_BUFFER};

/// Universal class tags used by the X.509 grammar.
pub mod tag {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const UTF8_STRING: u8 = 0x0C;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    pub const BMP_STRING: u8 = 0x1E;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;

    /// Context-specific implicit tag for field index `i`.
    pub const fn context_implicit(i: u8) -> u8 {
        0x80 | i
    }

    /// Context-specific explicit (constructed) tag for field index `i`.
    pub const fn context_explicit(i: u8) -> u8 {
        0xA0 | i
    }
}

/// A decoded tag + content pair. The tag's own length prefix is not
/// retained; callers that need the exact encoded bytes of a sub-tree (e.g.
/// `tbsCertificate`) capture them separately via stream position, not
/// through this type.
#[derive(Debug, Clone)]
pub struct Tlv {
    pub tag: u8,
    pub content: Vec<u8>,
}

/// Reads a BER length field. `Ok(None)` means the indefinite form (`0x80`);
/// the caller must then read content until the `00 00` sentinel.
pub fn read_length(stream: &mut dyn Stream) -> Result<Option<usize>, Error> {
    let first = stream
        .read_one()
        .ok_or_else(|| Error::parse("missing length: end of stream"))?;
    if first == 0x80 {
        Ok(None)
    } else if first & 0x80 == 0 {
        Ok(Some(first as usize))
    } else {
        let n = (first & 0x7F) as usize;
        let bytes = stream
            .read_n(n)
            .filter(|b| b.len() == n)
            .ok_or_else(|| Error::parse("truncated long-form length"))?;
        let mut len: usize = 0;
        for b in &bytes {
            len = len
                .checked_shl(8)
                .ok_or_else(|| Error::parse("length field overflow"))?;
            len |= *b as usize;
        }
        Ok(Some(len))
    }
}

fn read_indefinite_content(stream: &mut dyn Stream) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    loop {
        if buf.len() >= MAX_INDEFINITE_LENGTH_BUFFER {
            return Err(Error::parse(
                "indefinite-length content exceeds the buffering cap",
            ));
        }
        let b = stream
            .read_one()
            .ok_or_else(|| Error::parse("unterminated indefinite-length content"))?;
        buf.push(b);
        if buf.len() >= 2 && buf[buf.len() - 2..] == [0x00, 0x00] {
            buf.truncate(buf.len() - 2);
            return Ok(buf);
        }
    }
}

/// Reads the length and content octets that follow an already-consumed tag
/// byte.
pub fn read_content(stream: &mut dyn Stream) -> Result<Vec<u8>, Error> {
    match read_length(stream)? {
        Some(len) => stream
            .read_n(len)
            .filter(|b| b.len() == len)
            .ok_or_else(|| Error::parse("truncated element content")),
        None => read_indefinite_content(stream),
    }
}

/// Reads one TLV unconditionally: a missing or truncated element is a hard
/// parse error.
pub fn read_tlv(stream: &mut dyn Stream) -> Result<Tlv, Error> {
    let tag = stream
        .read_one()
        .ok_or_else(|| Error::parse("missing tag: end of stream"))?;
    let content = read_content(stream)?;
    Ok(Tlv { tag, content })
}

/// Attempts to read a TLV tagged `expected_tag`. On a tag mismatch (or end
/// of stream), the attempt is rolled back and `Ok(None)` is returned so the
/// caller can try another alternative or treat the field as absent. This is
/// the soft-fail path `SequenceReader` and `parse_choice` build on; it
/// requires at most one outstanding mark, which this function manages
/// itself.
pub fn try_read_tlv(stream: &mut Markable, expected_tag: u8) -> Result<Option<Tlv>, Error> {
    if !stream.mark() {
        return Err(Error::parse("markable stream already has an outstanding mark"));
    }
    let tag = match stream.read_one() {
        Some(t) => t,
        None => {
            stream.restore();
            return Ok(None);
        }
    };
    if tag != expected_tag {
        stream.restore();
        return Ok(None);
    }
    stream.commit();
    let content = read_content(stream)?;
    Ok(Some(Tlv { tag, content }))
}

/// A cursor over a constructed element's content that dispenses named
/// fields in declaration order, per the modifiers described in the X.509
/// grammar (`index`, `explicit`/`implicit`, `optional`, `default`).
pub struct SequenceReader<'s> {
    stream: Markable<'s>,
}

impl<'s> SequenceReader<'s> {
    pub fn new(stream: &'s mut dyn Stream) -> Self {
        SequenceReader {
            stream: Markable::new(stream),
        }
    }

    /// A required field with a plain universal tag.
    pub fn required<T>(
        &mut self,
        expected_tag: u8,
        name: &str,
        parse: impl FnOnce(Tlv) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let tlv = read_tlv(&mut self.stream).map_err(|e| e.with_context(name.to_string()))?;
        if tlv.tag != expected_tag {
            return Err(Error::parse(format!(
                "invalid tag: got {:#04x}, want {:#04x}",
                tlv.tag, expected_tag
            ))
            .with_context(name.to_string()));
        }
        parse(tlv).map_err(|e| e.with_context(name.to_string()))
    }

    /// An optional or defaulted field at context-specific index `index`.
    /// `implicit = true` reads it tagged `0x80|index` with the inner
    /// element's own content; `implicit = false` reads it tagged
    /// `0xA0|index` wrapping exactly one inner TLV (the explicit envelope).
    pub fn optional_context<T>(
        &mut self,
        index: u8,
        implicit: bool,
        name: &str,
        parse: impl FnOnce(Tlv) -> Result<T, Error>,
    ) -> Result<Option<T>, Error> {
        let expected = if implicit {
            tag::context_implicit(index)
        } else {
            tag::context_explicit(index)
        };
        match try_read_tlv(&mut self.stream, expected)? {
            None => Ok(None),
            Some(outer) if implicit => {
                parse(outer).map(Some).map_err(|e| e.with_context(name.to_string()))
            }
            Some(outer) => {
                let mut inner_stream = crate::stream::SliceStream::new(outer.content);
                let inner =
                    read_tlv(&mut inner_stream).map_err(|e| e.with_context(name.to_string()))?;
                parse(inner).map(Some).map_err(|e| e.with_context(name.to_string()))
            }
        }
    }

    /// A context-tagged field whose absence falls back to `default` rather
    /// than failing, e.g. `tbsCertificate.version` (index 0, explicit,
    /// default v1).
    pub fn with_default<T>(
        &mut self,
        index: u8,
        implicit: bool,
        name: &str,
        default: T,
        parse: impl FnOnce(Tlv) -> Result<T, Error>,
    ) -> Result<T, Error> {
        match self.optional_context(index, implicit, name, parse)? {
            Some(v) => Ok(v),
            None => Ok(default),
        }
    }

    /// A CHOICE field: tries each `(tag, parser)` alternative in turn,
    /// taking the first whose tag matches.
    pub fn choice<T>(
        &mut self,
        name: &str,
        alternatives: &[(u8, fn(Tlv) -> Result<T, Error>)],
    ) -> Result<T, Error> {
        for (expected_tag, parse) in alternatives {
            if let Some(tlv) = try_read_tlv(&mut self.stream, *expected_tag)? {
                return parse(tlv).map_err(|e| e.with_context(name.to_string()));
            }
        }
        Err(Error::parse("no valid choice").with_context(name.to_string()))
    }

    /// An optional `ANY`-typed field: since `ANY` carries no fixed tag to
    /// match against, presence is decided solely by whether any content
    /// remains.
    pub fn optional_any(&mut self, name: &str) -> Result<Option<Any>, Error> {
        if !self.stream.has_more() {
            return Ok(None);
        }
        let tlv = read_tlv(&mut self.stream).map_err(|e| e.with_context(name.to_string()))?;
        Any::parse(tlv).map(Some)
    }

    /// An optional field with a plain universal tag (no context index).
    pub fn optional<T>(
        &mut self,
        expected_tag: u8,
        name: &str,
        parse: impl FnOnce(Tlv) -> Result<T, Error>,
    ) -> Result<Option<T>, Error> {
        match try_read_tlv(&mut self.stream, expected_tag)? {
            None => Ok(None),
            Some(tlv) => parse(tlv).map(Some).map_err(|e| e.with_context(name.to_string())),
        }
    }
}

/// Parses `SEQUENCE OF` / `SET OF` content by repeatedly applying
/// `parse_one` until the content is exhausted.
pub fn parse_repeated<T>(
    content: Vec<u8>,
    mut parse_one: impl FnMut(&mut dyn Stream) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let mut stream = crate::stream::SliceStream::new(content);
    let mut items = Vec::new();
    while stream.has_more() {
        items.push(parse_one(&mut stream)?);
    }
    Ok(items)
}

/// Tries each `(tag, parser)` alternative in order under a mark, returning
/// the first that matches — the CHOICE rule. Fails with "no valid choice"
/// if none do.
pub fn parse_choice<T>(
    stream: &mut dyn Stream,
    alternatives: &[(u8, &dyn Fn(Tlv) -> Result<T, Error>)],
) -> Result<T, Error> {
    let mut markable = Markable::new(stream);
    for (expected_tag, parse) in alternatives {
        if let Some(tlv) = try_read_tlv(&mut markable, *expected_tag)? {
            return parse(tlv);
        }
    }
    Err(Error::parse("no valid choice"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SliceStream;

    #[test]
    fn short_form_length() {
        let mut s = SliceStream::new(vec![0x05]);
        assert_eq!(read_length(&mut s).unwrap(), Some(5));
    }

    #[test]
    fn long_form_length() {
        let mut s = SliceStream::new(vec![0x82, 0x01, 0x00]);
        assert_eq!(read_length(&mut s).unwrap(), Some(256));
    }

    #[test]
    fn indefinite_length_reports_none() {
        let mut s = SliceStream::new(vec![0x80]);
        assert_eq!(read_length(&mut s).unwrap(), None);
    }

    #[test]
    fn indefinite_content_stops_at_sentinel() {
        let mut s = SliceStream::new(vec![0x01, 0x02, 0x00, 0x00, 0xFF]);
        assert_eq!(read_indefinite_content(&mut s).unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn read_tlv_rejects_truncated_content() {
        let mut s = SliceStream::new(vec![tag::INTEGER, 0x02, 0x01]);
        assert!(read_tlv(&mut s).is_err());
    }

    #[test]
    fn try_read_tlv_rolls_back_on_mismatch() {
        let mut s = SliceStream::new(vec![tag::NULL, 0x00]);
        let mut m = Markable::new(&mut s);
        assert!(try_read_tlv(&mut m, tag::BOOLEAN).unwrap().is_none());
        assert!(try_read_tlv(&mut m, tag::NULL).unwrap().is_some());
    }
}
