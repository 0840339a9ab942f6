//! `Certificate` / `TBSCertificate` (RFC 5280 §4.1) and the read-only
//! [`Certificate`] façade (§4.D) built on top of them.

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::asn1::{self, oid_table, tag, well_known_oid_name, Any, BitString, Integer, ObjectIdentifier};
use crate::error::Error;
use crate::stream::SliceStream;
use crate::x509::name::DistinguishedName;
use crate::x509::{AlgorithmIdentifier, Extension, SubjectAltName, SubjectPublicKeyInfo, Validity};

/// `TBSCertificate ::= SEQUENCE { version [0] EXPLICIT INTEGER DEFAULT v1,
/// serialNumber INTEGER, signature AlgorithmIdentifier, issuer Name,
/// validity Validity, subject Name, subjectPublicKeyInfo
/// SubjectPublicKeyInfo, issuerUniqueID [1] IMPLICIT BIT STRING OPTIONAL,
/// subjectUniqueID [2] IMPLICIT BIT STRING OPTIONAL, extensions [3]
/// EXPLICIT Extensions OPTIONAL }`
#[derive(Debug, Clone)]
pub struct TbsCertificate {
    pub version: i64,
    pub serial_number: Integer,
    pub signature: AlgorithmIdentifier,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    pub extensions: Vec<Extension>,
}

impl TbsCertificate {
    fn parse_content(content: Vec<u8>) -> Result<TbsCertificate, Error> {
        let mut stream = SliceStream::new(content);
        let mut seq = asn1::SequenceReader::new(&mut stream);

        let version = seq.with_default(0, false, "version", 0i64, |tlv| {
            Integer::parse(tlv.content, Some(&[0, 1, 2]))?
                .as_i64()
                .ok_or_else(|| Error::parse("version does not fit in an i64"))
        })?;

        let serial_number = seq.required(tag::INTEGER, "serialNumber", |tlv| {
            Integer::parse(tlv.content, None)
        })?;

        let signature = seq.required(tag::SEQUENCE, "signature", AlgorithmIdentifier::parse_content)?;

        let issuer = seq.required(tag::SEQUENCE, "issuer", DistinguishedName::parse_content)?;

        let validity = seq.required(tag::SEQUENCE, "validity", Validity::parse_content)?;

        let subject = seq.required(tag::SEQUENCE, "subject", DistinguishedName::parse_content)?;

        let subject_public_key_info = seq.required(
            tag::SEQUENCE,
            "subjectPublicKeyInfo",
            SubjectPublicKeyInfo::parse_content,
        )?;

        // issuerUniqueID / subjectUniqueID: parsed to keep the field cursor
        // correctly positioned ahead of `extensions`, but not otherwise
        // exposed — the scanner has no use for them.
        let _issuer_unique_id = seq.optional_context(1, true, "issuerUniqueID", |tlv| {
            BitString::parse(tlv.content)
        })?;
        let _subject_unique_id = seq.optional_context(2, true, "subjectUniqueID", |tlv| {
            BitString::parse(tlv.content)
        })?;

        let extensions = seq
            .optional_context(3, false, "extensions", |tlv| {
                if tlv.tag != tag::SEQUENCE {
                    return Err(Error::parse("invalid tag for Extensions"));
                }
                asn1::parse_repeated(tlv.content, Extension::parse)
            })?
            .unwrap_or_default();

        Ok(TbsCertificate {
            version,
            serial_number,
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            extensions,
        })
    }
}

/// A read-only façade over a parsed X.509 certificate (§4.D). Owns the
/// parsed tree; `tbs_bytes()` returns the byte image of the `tbsCertificate`
/// sub-tree exactly as it appeared in the input DER.
#[derive(Debug, Clone)]
pub struct Certificate {
    tbs: TbsCertificate,
    signature_algorithm: AlgorithmIdentifier,
    signature_value: BitString,
    tbs_bytes: Vec<u8>,
}

impl Certificate {
    /// Parses a `Certificate ::= SEQUENCE { tbsCertificate, signatureAlgorithm,
    /// signatureValue }` from raw DER (or non-canonical BER) bytes.
    ///
    /// `tbs_bytes` is recovered by position-tracking over the already
    /// fully-buffered input rather than a content-capturing stream overlay:
    /// since the whole certificate is parsed from one owned buffer (never
    /// streamed incrementally), slicing by byte offset captures the exact
    /// original `tbsCertificate` TLV — tag, length, and content — which is
    /// what the signature hash is computed over.
    pub fn parse(der: &[u8]) -> Result<Certificate, Error> {
        let mut outer_stream = SliceStream::new(der.to_vec());
        let outer = asn1::read_tlv(&mut outer_stream).map_err(|e| e.with_context("Certificate"))?;
        if outer.tag != tag::SEQUENCE {
            return Err(Error::parse(format!(
                "invalid tag: got {:#04x}, want {:#04x}",
                outer.tag,
                tag::SEQUENCE
            ))
            .with_context("Certificate"));
        }

        let content = outer.content;
        let mut inner = SliceStream::new(content.clone());

        let tbs_start = inner.position();
        let tbs_tlv = asn1::read_tlv(&mut inner).map_err(|e| e.with_context("tbsCertificate"))?;
        if tbs_tlv.tag != tag::SEQUENCE {
            return Err(Error::parse(format!(
                "invalid tag: got {:#04x}, want {:#04x}",
                tbs_tlv.tag,
                tag::SEQUENCE
            ))
            .with_context("tbsCertificate"));
        }
        let tbs_end = inner.position();
        let tbs_bytes = content[tbs_start..tbs_end].to_vec();
        let tbs = TbsCertificate::parse_content(tbs_tlv.content).map_err(|e| e.with_context("tbsCertificate"))?;

        let mut seq = asn1::SequenceReader::new(&mut inner);
        let signature_algorithm =
            seq.required(tag::SEQUENCE, "signatureAlgorithm", AlgorithmIdentifier::parse_content)?;
        let signature_value =
            seq.required(tag::BIT_STRING, "signatureValue", |tlv| BitString::parse(tlv.content))?;

        Ok(Certificate {
            tbs,
            signature_algorithm,
            signature_value,
            tbs_bytes,
        })
    }

    /// `tbsCertificate.version`, normalized to `0`/`1`/`2` for v1/v2/v3.
    pub fn version(&self) -> i64 {
        self.tbs.version
    }

    /// The certificate serial number, as an arbitrary-width integer.
    pub fn serial_number(&self) -> &Integer {
        &self.tbs.serial_number
    }

    /// `Certificate.signatureAlgorithm` (the outer algorithm actually used
    /// to sign — authoritative over `tbsCertificate.signature`, which must
    /// match it per RFC 5280 §4.1.1.2 but isn't relied on here).
    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.tbs.issuer
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.tbs.subject
    }

    pub fn validity_not_before(&self) -> Result<chrono::DateTime<chrono::Utc>, Error> {
        self.tbs.validity.not_before.to_datetime()
    }

    pub fn validity_not_after(&self) -> Result<chrono::DateTime<chrono::Utc>, Error> {
        self.tbs.validity.not_after.to_datetime()
    }

    /// The SPKI's algorithm OID.
    pub fn subject_public_key_algorithm(&self) -> &ObjectIdentifier {
        &self.tbs.subject_public_key_info.algorithm.algorithm
    }

    /// The SPKI's `subjectPublicKey` BIT STRING.
    pub fn subject_public_key(&self) -> &BitString {
        &self.tbs.subject_public_key_info.subject_public_key
    }

    /// `tbsCertificate.extensions`, in wire order.
    pub fn extensions(&self) -> &[Extension] {
        &self.tbs.extensions
    }

    /// Looks up an extension by OID.
    pub fn extension(&self, oid: &ObjectIdentifier) -> Option<&Extension> {
        self.tbs.extensions.iter().find(|e| &e.extn_id == oid)
    }

    /// The decoded `subjectAltName` extension, if present.
    pub fn subject_alt_name(&self) -> Option<Result<SubjectAltName, Error>> {
        self.extension(&oid_table::SUBJECT_ALT_NAME)
            .map(Extension::as_subject_alt_name)
    }

    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }

    /// The byte image of the `tbsCertificate` sub-tree as it appeared on
    /// the wire — the exact input to the signature hash.
    pub fn tbs_bytes(&self) -> &[u8] {
        &self.tbs_bytes
    }

    /// Whether `h` matches the subject CN or any `dNSName` SAN. A literal
    /// match succeeds outright; a SAN of the form `*.rest` matches any `h`
    /// ending in `.rest`.
    pub fn hostname_matches(&self, h: &str) -> bool {
        let mut candidates: Vec<String> = Vec::new();
        if let Some(cn) = self.subject().get(&oid_table::CN) {
            candidates.push(cn.as_str().to_string());
        }
        if let Some(Ok(san)) = self.subject_alt_name() {
            candidates.extend(san.host_strings().map(|s| s.to_string()));
        }
        candidates.iter().any(|name| hostname_matches_one(name, h))
    }

    /// Whether the current UTC time falls within `[notBefore, notAfter]`.
    pub fn is_valid_now(&self) -> Result<bool, Error> {
        let now = chrono::Utc::now();
        let not_before = self.validity_not_before()?;
        let not_after = self.validity_not_after()?;
        Ok(now >= not_before && now <= not_after)
    }

    /// Verifies this certificate's signature against `issuer`'s public key
    /// (§4.D step 4). Returns `false`, never an error, for an unrecognized
    /// signature algorithm or a malformed key/signature — verification is a
    /// yes/no question, not a parse.
    pub fn verify_signature(&self, issuer: &Certificate) -> bool {
        let digest = match self.compute_tbs_digest() {
            Some(d) => d,
            None => return false,
        };
        let digest_info = build_digest_info(&digest.0, &digest.1);

        let (n, e) = match rsa_public_key_from_spki(issuer) {
            Some(k) => k,
            None => return false,
        };

        let signature = &self.signature_value.bytes;
        let decrypted = match rsa_raw_public_decrypt(&n, &e, signature) {
            Some(d) => d,
            None => return false,
        };

        pkcs1_v15_matches(&decrypted, &digest_info, n.len())
    }

    /// `(digest bytes, digest algorithm OID)` for `signature_algorithm`, or
    /// `None` for an unrecognized algorithm.
    fn compute_tbs_digest(&self) -> Option<(Vec<u8>, ObjectIdentifier)> {
        let name = well_known_oid_name(&self.signature_algorithm.algorithm)?;
        match name {
            "sha256WithRSAEncryption" => {
                let digest = Sha256::digest(self.tbs_bytes()).to_vec();
                Some((digest, sha256_oid()))
            }
            "sha1WithRSAEncryption" => {
                let digest = Sha1::digest(self.tbs_bytes()).to_vec();
                Some((digest, sha1_oid()))
            }
            _ => None,
        }
    }
}

fn sha256_oid() -> ObjectIdentifier {
    // 2.16.840.1.101.3.4.2.1 (id-sha256)
    ObjectIdentifier::parse(&[
        0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    ])
    .expect("hard-coded SHA-256 OID is well-formed")
}

fn sha1_oid() -> ObjectIdentifier {
    // 1.3.14.3.2.26 (id-sha1)
    ObjectIdentifier::parse(&[0x2B, 0x0E, 0x03, 0x02, 0x1A]).expect("hard-coded SHA-1 OID is well-formed")
}

/// Builds the DER bytes of `DigestInfo ::= SEQUENCE { digestAlgorithm
/// AlgorithmIdentifier, digest OCTET STRING }` (PKCS#1 v1.5 §9.2).
fn build_digest_info(digest: &[u8], algorithm: &ObjectIdentifier) -> Vec<u8> {
    let oid_der = Any {
        tag: tag::OBJECT_IDENTIFIER,
        content: algorithm.to_content_bytes(),
    }
    .to_der();
    let null_der = Any {
        tag: tag::NULL,
        content: Vec::new(),
    }
    .to_der();
    let mut alg_content = Vec::new();
    alg_content.extend_from_slice(&oid_der);
    alg_content.extend_from_slice(&null_der);
    let alg_der = Any {
        tag: tag::SEQUENCE,
        content: alg_content,
    }
    .to_der();

    let digest_der = Any {
        tag: tag::OCTET_STRING,
        content: digest.to_vec(),
    }
    .to_der();

    let mut digest_info_content = Vec::new();
    digest_info_content.extend_from_slice(&alg_der);
    digest_info_content.extend_from_slice(&digest_der);

    Any {
        tag: tag::SEQUENCE,
        content: digest_info_content,
    }
    .to_der()
}

/// Decodes `issuer`'s SPKI as an RSA public key `(modulus, exponent)`,
/// both as big-endian unsigned magnitude bytes.
fn rsa_public_key_from_spki(issuer: &Certificate) -> Option<(Vec<u8>, Vec<u8>)> {
    let name = well_known_oid_name(issuer.subject_public_key_algorithm())?;
    if name != "rsaEncryption" {
        return None;
    }
    let key_bits = issuer.subject_public_key().bytes.clone();
    let mut stream = SliceStream::new(key_bits);
    let parsed = asn1::read_tlv(&mut stream).ok()?;
    if parsed.tag != tag::SEQUENCE {
        return None;
    }
    let mut inner = SliceStream::new(parsed.content);
    let mut seq = asn1::SequenceReader::new(&mut inner);
    let modulus = seq
        .required(tag::INTEGER, "modulus", |t| Integer::parse(t.content, None))
        .ok()?;
    let exponent = seq
        .required(tag::INTEGER, "publicExponent", |t| Integer::parse(t.content, None))
        .ok()?;
    Some((modulus.to_unsigned_bytes(), exponent.to_unsigned_bytes()))
}

/// `signature^e mod n`, left-padded to `n`'s byte length — the raw RSA
/// "decrypt" step of PKCS#1 v1.5 verification. This is the one place the
/// core reaches outside the ASN.1/TLS engines for a cryptographic
/// primitive (big-integer modular exponentiation), which it consumes from
/// the `rsa` crate's `BigUint` rather than hand-rolling bignum arithmetic.
fn rsa_raw_public_decrypt(n: &[u8], e: &[u8], signature: &[u8]) -> Option<Vec<u8>> {
    use rsa::BigUint;
    let modulus = BigUint::from_bytes_be(n);
    let exponent = BigUint::from_bytes_be(e);
    let sig = BigUint::from_bytes_be(signature);
    if sig >= modulus {
        return None;
    }
    let result = sig.modpow(&exponent, &modulus);
    let mut bytes = result.to_bytes_be();
    let modulus_len = n.len();
    if bytes.len() > modulus_len {
        return None;
    }
    let mut padded = vec![0u8; modulus_len - bytes.len()];
    padded.append(&mut bytes);
    Some(padded)
}

/// Checks `decrypted == 0x00 0x01 FF..FF 0x00 || digest_info`.
fn pkcs1_v15_matches(decrypted: &[u8], digest_info: &[u8], modulus_len: usize) -> bool {
    if decrypted.len() != modulus_len {
        return false;
    }
    if digest_info.len() + 11 > modulus_len {
        return false;
    }
    let padding_len = modulus_len - digest_info.len() - 3;
    if decrypted[0] != 0x00 || decrypted[1] != 0x01 {
        return false;
    }
    if decrypted[2..2 + padding_len].iter().any(|&b| b != 0xFF) {
        return false;
    }
    if decrypted[2 + padding_len] != 0x00 {
        return false;
    }
    &decrypted[3 + padding_len..] == digest_info
}

fn hostname_matches_one(candidate: &str, host: &str) -> bool {
    match candidate.strip_prefix("*.") {
        Some(rest) => host.ends_with(&format!(".{rest}")),
        None => candidate.eq_ignore_ascii_case(host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_wildcard_matches_single_label() {
        assert!(hostname_matches_one("*.example.org", "api.example.org"));
        assert!(!hostname_matches_one("*.example.org", "example.org"));
    }

    #[test]
    fn hostname_wildcard_requires_a_label_boundary() {
        assert!(!hostname_matches_one("*.example.org", "xexample.org"));
    }

    #[test]
    fn hostname_literal_match_is_case_insensitive() {
        assert!(hostname_matches_one("Example.org", "example.ORG"));
    }

    #[test]
    fn pkcs1_v15_padding_check_rejects_short_buffers() {
        assert!(!pkcs1_v15_matches(&[0x00, 0x01], &[0xAA], 256));
    }
}
