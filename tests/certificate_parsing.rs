mod support;

use tls_sak::asn1::oid_table;
use tls_sak::x509::Certificate;

#[test]
fn parses_subject_issuer_and_validity() {
    let der = support::build_certificate("example.org", "Test CA", &[]);
    let cert = Certificate::parse(&der).unwrap();

    assert_eq!(cert.version(), 2);
    assert_eq!(cert.subject().get(&oid_table::CN).unwrap().as_str(), "example.org");
    assert_eq!(cert.issuer().get(&oid_table::CN).unwrap().as_str(), "Test CA");

    let not_before = cert.validity_not_before().unwrap();
    let not_after = cert.validity_not_after().unwrap();
    assert!(not_before < not_after);
    assert!(cert.is_valid_now().unwrap());
}

#[test]
fn hostname_matches_against_common_name_when_no_san() {
    let der = support::build_certificate("example.org", "Test CA", &[]);
    let cert = Certificate::parse(&der).unwrap();

    assert!(cert.hostname_matches("example.org"));
    assert!(!cert.hostname_matches("other.org"));
    assert!(cert.subject_alt_name().is_none());
}

#[test]
fn hostname_matches_against_wildcard_san() {
    let der = support::build_certificate("placeholder", "Test CA", &["*.example.org", "example.org"]);
    let cert = Certificate::parse(&der).unwrap();

    assert!(cert.hostname_matches("www.example.org"));
    assert!(cert.hostname_matches("example.org"));
    assert!(!cert.hostname_matches("example.com"));
}

#[test]
fn tbs_bytes_is_a_contiguous_slice_of_the_input() {
    let der = support::build_certificate("example.org", "Test CA", &["example.org"]);
    let cert = Certificate::parse(&der).unwrap();

    let tbs = cert.tbs_bytes();
    let pos = der
        .windows(tbs.len())
        .position(|w| w == tbs)
        .expect("tbs_bytes must appear as a contiguous slice of the certificate DER");
    assert_eq!(&der[pos..pos + tbs.len()], tbs);
}

#[test]
fn rejects_truncated_der() {
    let der = support::build_certificate("example.org", "Test CA", &[]);
    let truncated = &der[..der.len() - 5];
    assert!(Certificate::parse(truncated).is_err());
}
