use crate::error::Error;

/// Content rule for BOOLEAN: length must be 1; any nonzero byte is true.
pub fn parse_boolean(content: &[u8]) -> Result<bool, Error> {
    match content {
        [v] => Ok(*v != 0),
        _ => Err(Error::parse(format!(
            "BOOLEAN has invalid length {} (want 1)",
            content.len()
        ))),
    }
}

/// An arbitrary-width big-endian two's-complement INTEGER.
///
/// Serial numbers routinely exceed 64 bits, so the raw encoding is kept
/// rather than forcing a fixed-width type; small values (version numbers,
/// enumerations) are read back out through [`Integer::as_i64`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integer {
    raw: Vec<u8>,
}

impl Integer {
    /// Parses the content octets of an INTEGER element. `valid_values`, if
    /// given, restricts the decoded value (used for e.g. `version ::=
    /// INTEGER { v1(0), v2(1), v3(2) }`).
    pub fn parse(content: Vec<u8>, valid_values: Option<&[i64]>) -> Result<Integer, Error> {
        if content.is_empty() {
            return Err(Error::parse("INTEGER has zero-length content"));
        }
        let int = Integer { raw: content };
        if let Some(allowed) = valid_values {
            match int.as_i64() {
                Some(v) if allowed.contains(&v) => {}
                _ => return Err(Error::parse("INTEGER value not in the permitted set")),
            }
        }
        Ok(int)
    }

    /// Decodes as a signed `i64`, two's-complement, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        if self.raw.len() > 8 {
            return None;
        }
        let negative = self.raw[0] & 0x80 != 0;
        let mut buf = [if negative { 0xFF } else { 0x00 }; 8];
        let offset = 8 - self.raw.len();
        buf[offset..].copy_from_slice(&self.raw);
        Some(i64::from_be_bytes(buf))
    }

    /// The raw two's-complement big-endian bytes, as encoded.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The unsigned magnitude, big-endian, with any sign-extension byte
    /// stripped. Used for RSA modulus/exponent material, which is always
    /// non-negative despite being carried in an ASN.1 INTEGER.
    pub fn to_unsigned_bytes(&self) -> Vec<u8> {
        let mut bytes = self.raw.as_slice();
        while bytes.len() > 1 && bytes[0] == 0x00 {
            bytes = &bytes[1..];
        }
        bytes.to_vec()
    }
}

/// A BIT STRING: a count of unused trailing bits in the final octet, plus
/// the octets themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    pub unused_bits: u8,
    pub bytes: Vec<u8>,
}

impl BitString {
    pub fn parse(content: Vec<u8>) -> Result<BitString, Error> {
        let (unused, rest) = content
            .split_first()
            .ok_or_else(|| Error::parse("BIT STRING missing unused-bits octet"))?;
        if *unused > 7 {
            return Err(Error::parse("BIT STRING unused-bits count out of range"));
        }
        Ok(BitString {
            unused_bits: *unused,
            bytes: rest.to_vec(),
        })
    }
}

/// Content rule for NULL: length must be 0.
pub fn parse_null(content: &[u8]) -> Result<(), Error> {
    if content.is_empty() {
        Ok(())
    } else {
        Err(Error::parse("NULL has nonzero-length content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_any_nonzero_is_true() {
        assert!(!parse_boolean(&[0x00]).unwrap());
        assert!(parse_boolean(&[0x01]).unwrap());
        assert!(parse_boolean(&[0xFF]).unwrap());
        assert!(parse_boolean(&[0x00, 0x01]).is_err());
    }

    #[test]
    fn integer_decodes_negative_two_complement() {
        let int = Integer::parse(vec![0xFF], None).unwrap();
        assert_eq!(int.as_i64(), Some(-1));
    }

    #[test]
    fn integer_decodes_positive_multibyte() {
        let int = Integer::parse(vec![0x01, 0x00], None).unwrap();
        assert_eq!(int.as_i64(), Some(256));
    }

    #[test]
    fn integer_rejects_out_of_set_value() {
        assert!(Integer::parse(vec![0x05], Some(&[1, 2, 3])).is_err());
    }

    #[test]
    fn unsigned_bytes_strips_sign_extension() {
        let int = Integer::parse(vec![0x00, 0xFF, 0x10], None).unwrap();
        assert_eq!(int.to_unsigned_bytes(), vec![0xFF, 0x10]);
    }

    #[test]
    fn bit_string_splits_unused_bits_octet() {
        let bs = BitString::parse(vec![0x04, 0xF0]).unwrap();
        assert_eq!(bs.unused_bits, 4);
        assert_eq!(bs.bytes, vec![0xF0]);
    }
}
