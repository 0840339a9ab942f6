//! Cipher-suite and compression-method registries.
//!
//! Both tables are embedded at compile time (`include_str!`) and parsed
//! once into an immutable lookup, mirroring the teacher crate's lazily
//! loaded root certificate store: a `once_cell::sync::Lazy` static rather
//! than a runtime singleton with interior mutability.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// A registered TLS cipher suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherSuite {
    pub id: [u8; 2],
    pub name: String,
    pub kx: String,
    pub au: String,
    pub enc: String,
    pub bits: u32,
    pub mac: String,
    pub reference: Option<String>,
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:#04x}{:02x})", self.name, self.id[0], self.id[1])
    }
}

impl CipherSuite {
    fn unknown(id: [u8; 2]) -> CipherSuite {
        CipherSuite {
            id,
            name: format!("unknown ({:#04x}{:02x})", id[0], id[1]),
            kx: String::new(),
            au: String::new(),
            enc: String::new(),
            bits: 0,
            mac: String::new(),
            reference: None,
        }
    }
}

/// A registered TLS compression method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionMethod {
    pub id: u8,
    pub name: String,
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:#04x})", self.name, self.id)
    }
}

impl CompressionMethod {
    fn unknown(id: u8) -> CompressionMethod {
        CompressionMethod {
            id,
            name: format!("unknown ({id:#04x})"),
        }
    }
}

#[derive(Deserialize)]
struct RawCipherSuite {
    name: String,
    kx: String,
    au: String,
    enc: String,
    bits: u32,
    mac: String,
    #[serde(rename = "ref")]
    reference: Option<String>,
}

#[derive(Deserialize)]
struct RawCompressionMethod {
    name: String,
}

const CIPHERSUITES_JSON: &str = include_str!("../data/ciphersuites.json");
const COMPRESSIONMETHODS_JSON: &str = include_str!("../data/compressionmethods.json");

/// The full cipher-suite table, keyed by 2-byte id.
pub struct CipherSuiteRegistry {
    by_id: HashMap<[u8; 2], CipherSuite>,
    ordered: Vec<[u8; 2]>,
}

impl CipherSuiteRegistry {
    fn load() -> CipherSuiteRegistry {
        let raw: HashMap<String, RawCipherSuite> =
            serde_json::from_str(CIPHERSUITES_JSON).expect("data/ciphersuites.json is malformed");
        let mut by_id = HashMap::with_capacity(raw.len());
        let mut ordered = Vec::with_capacity(raw.len());
        for (hex_id, entry) in raw {
            let id = decode_hex_id2(&hex_id);
            ordered.push(id);
            by_id.insert(
                id,
                CipherSuite {
                    id,
                    name: entry.name,
                    kx: entry.kx,
                    au: entry.au,
                    enc: entry.enc,
                    bits: entry.bits,
                    mac: entry.mac,
                    reference: entry.reference,
                },
            );
        }
        ordered.sort();
        CipherSuiteRegistry { by_id, ordered }
    }

    /// The process-wide, lazily initialized registry.
    pub fn global() -> &'static CipherSuiteRegistry {
        static REGISTRY: Lazy<CipherSuiteRegistry> = Lazy::new(CipherSuiteRegistry::load);
        &REGISTRY
    }

    /// Resolves a 2-byte id to its registered entry, or a synthesized
    /// `unknown (0xXXXX)` placeholder if the id is not in the table.
    pub fn resolve(&self, id: [u8; 2]) -> CipherSuite {
        self.by_id
            .get(&id)
            .cloned()
            .unwrap_or_else(|| CipherSuite::unknown(id))
    }

    /// Every registered cipher suite, in ascending id order.
    pub fn all(&self) -> Vec<CipherSuite> {
        self.ordered.iter().map(|id| self.by_id[id].clone()).collect()
    }
}

/// The full compression-method table, keyed by 1-byte id.
pub struct CompressionMethodRegistry {
    by_id: HashMap<u8, CompressionMethod>,
}

impl CompressionMethodRegistry {
    fn load() -> CompressionMethodRegistry {
        let raw: HashMap<String, RawCompressionMethod> = serde_json::from_str(COMPRESSIONMETHODS_JSON)
            .expect("data/compressionmethods.json is malformed");
        let mut by_id = HashMap::with_capacity(raw.len());
        for (hex_id, entry) in raw {
            let id = decode_hex_id1(&hex_id);
            by_id.insert(id, CompressionMethod { id, name: entry.name });
        }
        CompressionMethodRegistry { by_id }
    }

    /// The process-wide, lazily initialized registry.
    pub fn global() -> &'static CompressionMethodRegistry {
        static REGISTRY: Lazy<CompressionMethodRegistry> = Lazy::new(CompressionMethodRegistry::load);
        &REGISTRY
    }

    /// Resolves a 1-byte id to its registered entry, or a synthesized
    /// `unknown (0xXX)` placeholder if the id is not in the table.
    pub fn resolve(&self, id: u8) -> CompressionMethod {
        self.by_id
            .get(&id)
            .cloned()
            .unwrap_or_else(|| CompressionMethod::unknown(id))
    }
}

fn decode_hex_id2(s: &str) -> [u8; 2] {
    let bytes = hex_bytes(s);
    assert_eq!(bytes.len(), 2, "cipher suite id must be 2 bytes: {s}");
    [bytes[0], bytes[1]]
}

fn decode_hex_id1(s: &str) -> u8 {
    let bytes = hex_bytes(s);
    assert_eq!(bytes.len(), 1, "compression method id must be 1 byte: {s}");
    bytes[0]
}

fn hex_bytes(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).expect("registry key is not hex"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_known_cipher_suite() {
        let registry = CipherSuiteRegistry::global();
        let suite = registry.resolve([0x00, 0x2F]);
        assert_eq!(suite.name, "TLS_RSA_WITH_AES_128_CBC_SHA");
    }

    #[test]
    fn unknown_id_synthesizes_a_placeholder() {
        let registry = CipherSuiteRegistry::global();
        let suite = registry.resolve([0xFF, 0xFF]);
        assert!(suite.name.starts_with("unknown"));
    }

    #[test]
    fn resolves_compression_method_none() {
        let registry = CompressionMethodRegistry::global();
        let cm = registry.resolve(0x00);
        assert_eq!(cm.name, "NULL");
    }

    #[test]
    fn registry_is_sync_and_send() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CipherSuiteRegistry>();
        assert_send_sync::<CompressionMethodRegistry>();
    }
}
