use std::fmt;

use crate::error::Error;

/// A parsed OBJECT IDENTIFIER, stored as its component arcs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier(Vec<u64>);

impl ObjectIdentifier {
    /// Decodes the content octets of an OID element.
    ///
    /// The first octet `f` encodes the first two arcs: if `f / 40 < 2`,
    /// they are `f / 40` and `f % 40`; otherwise the first arc is 2 and the
    /// second is `f - 80`. Remaining arcs are base-128, high-bit-continued,
    /// big-endian. A leading `0x80` continuation byte (encoding a
    /// zero-valued arc with a superfluous continuation flag) is illegal.
    pub fn parse(content: &[u8]) -> Result<ObjectIdentifier, Error> {
        if content.len() < 3 {
            return Err(Error::parse("OBJECT IDENTIFIER needs at least 3 bytes"));
        }

        let mut arcs = Vec::new();
        let first = content[0];
        if first / 40 < 2 {
            arcs.push((first / 40) as u64);
            arcs.push((first % 40) as u64);
        } else {
            arcs.push(2);
            arcs.push((first - 80) as u64);
        }

        let mut value: u64 = 0;
        let mut in_progress = false;
        for &b in &content[1..] {
            if b == 0x80 && !in_progress {
                return Err(Error::parse("OID arc may not have leading zero bytes"));
            }
            in_progress = true;
            value = value
                .checked_shl(7)
                .ok_or_else(|| Error::parse("OID arc overflow"))?;
            value |= (b & 0x7F) as u64;
            if b & 0x80 == 0 {
                arcs.push(value);
                value = 0;
                in_progress = false;
            }
        }
        if in_progress {
            return Err(Error::parse("OID ends mid-arc (missing final octet)"));
        }

        Ok(ObjectIdentifier(arcs))
    }

    /// Encodes back to BER content octets.
    pub fn to_content_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let first = (self.0[0] * 40 + self.0[1]) as u8;
        out.push(first);
        for &arc in &self.0[2..] {
            let mut chunks = Vec::new();
            let mut v = arc;
            chunks.push((v & 0x7F) as u8);
            v >>= 7;
            while v > 0 {
                chunks.push((v & 0x7F) as u8 | 0x80);
                v >>= 7;
            }
            chunks.reverse();
            out.extend_from_slice(&chunks);
        }
        out
    }

    pub fn arcs(&self) -> &[u64] {
        &self.0
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Well-known OIDs used by the X.509 grammar and signature verification.
/// Resolution is for display and extension dispatch only.
pub mod well_known {
    use super::ObjectIdentifier;
    use once_cell::sync::Lazy;
    use std::collections::HashMap;

    macro_rules! oid {
        ($($arc:expr),+ $(,)?) => {
            ObjectIdentifier(vec![$($arc),+])
        };
    }

    pub static RSA_ENCRYPTION: Lazy<ObjectIdentifier> =
        Lazy::new(|| oid!(1, 2, 840, 113549, 1, 1, 1));
    pub static SHA1_WITH_RSA_ENCRYPTION: Lazy<ObjectIdentifier> =
        Lazy::new(|| oid!(1, 2, 840, 113549, 1, 1, 5));
    pub static SHA256_WITH_RSA_ENCRYPTION: Lazy<ObjectIdentifier> =
        Lazy::new(|| oid!(1, 2, 840, 113549, 1, 1, 11));
    pub static CN: Lazy<ObjectIdentifier> = Lazy::new(|| oid!(2, 5, 4, 3));
    pub static COUNTRY: Lazy<ObjectIdentifier> = Lazy::new(|| oid!(2, 5, 4, 6));
    pub static ORGANIZATION: Lazy<ObjectIdentifier> = Lazy::new(|| oid!(2, 5, 4, 10));
    pub static SUBJECT_ALT_NAME: Lazy<ObjectIdentifier> = Lazy::new(|| oid!(2, 5, 29, 17));

    static TABLE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
        let mut m = HashMap::new();
        m.insert(RSA_ENCRYPTION.to_string(), "rsaEncryption");
        m.insert(SHA1_WITH_RSA_ENCRYPTION.to_string(), "sha1WithRSAEncryption");
        m.insert(
            SHA256_WITH_RSA_ENCRYPTION.to_string(),
            "sha256WithRSAEncryption",
        );
        m.insert(CN.to_string(), "CN");
        m.insert(COUNTRY.to_string(), "C");
        m.insert(ORGANIZATION.to_string(), "O");
        m.insert(SUBJECT_ALT_NAME.to_string(), "subjectAltName");
        m
    });

    /// Resolves a dotted-decimal OID to its short display name, if known.
    pub fn resolve(oid: &ObjectIdentifier) -> Option<&'static str> {
        TABLE.get(&oid.to_string()).copied()
    }
}
