//! Hand-rolled DER construction helpers shared by the integration tests.
//! Not a general-purpose encoder: just enough TLV/OID/INTEGER plumbing to
//! assemble fixture certificates and handshake messages byte by byte.

pub fn tlv(tag: u8, content: Vec<u8>) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(length(content.len()));
    out.extend(content);
    out
}

fn length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else {
        let bytes = len.to_be_bytes();
        let trimmed: Vec<u8> = bytes
            .iter()
            .skip_while(|&&b| b == 0)
            .copied()
            .collect();
        let mut out = vec![0x80 | trimmed.len() as u8];
        out.extend(trimmed);
        out
    }
}

pub fn sequence(parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(0x30, parts.concat())
}

pub fn oid(arcs: &[u64]) -> Vec<u8> {
    let mut content = Vec::new();
    content.push((arcs[0] * 40 + arcs[1]) as u8);
    for &arc in &arcs[2..] {
        let mut chunks = vec![(arc & 0x7F) as u8];
        let mut v = arc >> 7;
        while v > 0 {
            chunks.push((v & 0x7F) as u8 | 0x80);
            v >>= 7;
        }
        chunks.reverse();
        content.extend(chunks);
    }
    tlv(0x06, content)
}

pub fn integer(value: &[u8]) -> Vec<u8> {
    tlv(0x02, value.to_vec())
}

pub fn null() -> Vec<u8> {
    tlv(0x05, Vec::new())
}

pub fn utf8_string(s: &str) -> Vec<u8> {
    tlv(0x0C, s.as_bytes().to_vec())
}

pub fn ia5_string_implicit(index: u8, s: &str) -> Vec<u8> {
    tlv(0x80 | index, s.as_bytes().to_vec())
}

pub fn utc_time(s: &str) -> Vec<u8> {
    tlv(0x17, s.as_bytes().to_vec())
}

pub fn bit_string(unused_bits: u8, bytes: &[u8]) -> Vec<u8> {
    let mut content = vec![unused_bits];
    content.extend(bytes);
    tlv(0x03, content)
}

/// `[index] EXPLICIT <inner>`
pub fn context_explicit(index: u8, inner: Vec<u8>) -> Vec<u8> {
    tlv(0xA0 | index, inner)
}

pub fn algorithm_identifier(oid_arcs: &[u64]) -> Vec<u8> {
    sequence(&[oid(oid_arcs), null()])
}

pub const RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 1];
pub const SHA256_WITH_RSA: &[u64] = &[1, 2, 840, 113549, 1, 1, 11];
pub const CN: &[u64] = &[2, 5, 4, 3];
pub const SUBJECT_ALT_NAME: &[u64] = &[2, 5, 29, 17];

pub fn rdn_cn(common_name: &str) -> Vec<u8> {
    let atv = sequence(&[oid(CN), utf8_string(common_name)]);
    tlv(0x31, atv)
}

pub fn name(rdns: &[Vec<u8>]) -> Vec<u8> {
    sequence(&rdns.to_vec())
}

/// A minimal but structurally complete self-signed-shaped certificate: a
/// tiny (non-cryptographically-meaningful) RSA key, a CN-only subject and
/// issuer, and an optional `subjectAltName` extension carrying `dNSName`s.
pub fn build_certificate(subject_cn: &str, issuer_cn: &str, dns_names: &[&str]) -> Vec<u8> {
    let spki_inner = sequence(&[integer(&[0x01, 0x00, 0x01]), integer(&[0x01, 0x00, 0x01])]);
    let spki = sequence(&[algorithm_identifier(RSA_ENCRYPTION), bit_string(0, &spki_inner)]);

    let mut tbs_parts = vec![
        context_explicit(0, integer(&[0x02])), // version v3
        integer(&[0x01]),                      // serialNumber
        algorithm_identifier(SHA256_WITH_RSA),  // signature
        name(&[rdn_cn(issuer_cn)]),
        sequence(&[utc_time("200101000000Z"), utc_time("491231235959Z")]),
        name(&[rdn_cn(subject_cn)]),
        spki,
    ];

    if !dns_names.is_empty() {
        let general_names: Vec<u8> = dns_names
            .iter()
            .map(|n| ia5_string_implicit(2, n))
            .collect::<Vec<_>>()
            .concat();
        let san_value = tlv(0x30, general_names);
        let extension = sequence(&[oid(SUBJECT_ALT_NAME), tlv(0x04, san_value)]);
        let extensions = sequence(&[extension]);
        tbs_parts.push(context_explicit(3, extensions));
    }

    let tbs = sequence(&tbs_parts);
    let signature_algorithm = algorithm_identifier(SHA256_WITH_RSA);
    let signature_value = bit_string(0, &[0u8; 16]);

    sequence(&[tbs, signature_algorithm, signature_value])
}
