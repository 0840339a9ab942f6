//! PEM/DER ingestion (§6): accepts a certificate either PEM-wrapped
//! (`-----BEGIN CERTIFICATE-----` ... `-----END CERTIFICATE-----`, base64 of
//! DER in between) or as raw DER bytes, ahead of the [`crate::asn1`] engine.

use base64::prelude::{Engine, BASE64_STANDARD};

use crate::error::Error;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Normalizes `input` to a DER byte buffer.
///
/// If `input` looks like PEM (starts with the `BEGIN CERTIFICATE` marker
/// once leading whitespace is trimmed), the base64 body between the markers
/// is decoded. Otherwise `input` is assumed to already be DER and is
/// returned unchanged.
pub fn to_der(input: &[u8]) -> Result<Vec<u8>, Error> {
    let text = std::str::from_utf8(input).ok();
    match text.map(str::trim_start) {
        Some(trimmed) if trimmed.starts_with(PEM_BEGIN) => decode_pem(trimmed),
        _ => Ok(input.to_vec()),
    }
}

fn decode_pem(text: &str) -> Result<Vec<u8>, Error> {
    let after_begin = text
        .splitn(2, PEM_BEGIN)
        .nth(1)
        .ok_or_else(|| Error::parse("PEM input missing BEGIN CERTIFICATE marker"))?;
    let body = after_begin
        .splitn(2, PEM_END)
        .next()
        .ok_or_else(|| Error::parse("PEM input missing END CERTIFICATE marker"))?;

    let mut base64_body = String::with_capacity(body.len());
    for line in body.lines() {
        base64_body.push_str(line.trim());
    }

    BASE64_STANDARD
        .decode(base64_body.as_bytes())
        .map_err(Error::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_der_passes_through_unchanged() {
        let der = [0x30, 0x03, 0x02, 0x01, 0x05];
        assert_eq!(to_der(&der).unwrap(), der.to_vec());
    }

    #[test]
    fn pem_wrapped_der_is_decoded() {
        let der = [0x30u8, 0x03, 0x02, 0x01, 0x05];
        let encoded = BASE64_STANDARD.encode(der);
        let pem = format!("{PEM_BEGIN}\n{encoded}\n{PEM_END}\n");
        assert_eq!(to_der(pem.as_bytes()).unwrap(), der.to_vec());
    }

    #[test]
    fn pem_missing_end_marker_is_a_parse_error() {
        let pem = format!("{PEM_BEGIN}\nAAAA\n");
        assert!(to_der(pem.as_bytes()).is_err());
    }

    #[test]
    fn multiline_base64_body_is_joined_before_decoding() {
        let der = [0x30u8, 0x10, 0x02, 0x01, 0x05, 0x02, 0x01, 0x06, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08, 0x02, 0x01, 0x09];
        let encoded = BASE64_STANDARD.encode(der);
        let mid = encoded.len() / 2;
        let pem = format!("{PEM_BEGIN}\n{}\n{}\n{PEM_END}\n", &encoded[..mid], &encoded[mid..]);
        assert_eq!(to_der(pem.as_bytes()).unwrap(), der.to_vec());
    }
}
