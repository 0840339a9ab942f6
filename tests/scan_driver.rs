mod support;

use tls_sak::scan::ScanSession;
use tls_sak::tls::ProtocolVersion;
use tls_sak::transport::ScriptedTransport;
use tls_sak::x509::Certificate;

fn frame(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![msg_type];
    out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(body);
    out
}

fn handshake_record(messages: &[u8]) -> Vec<u8> {
    let mut out = vec![0x16, 0x03, 0x03];
    out.extend_from_slice(&(messages.len() as u16).to_be_bytes());
    out.extend_from_slice(messages);
    out
}

fn server_hello_body(cipher_suite: [u8; 2]) -> Vec<u8> {
    let mut body = vec![0x03, 0x03]; // TLS 1.2
    body.extend_from_slice(&0u32.to_be_bytes()); // gmt_unix_time
    body.extend_from_slice(&[0u8; 28]); // random
    body.push(0); // session_id length
    body.extend_from_slice(&cipher_suite);
    body.push(0x00); // compression method: NULL
    body
}

/// Exercises the full pipeline end to end: a scripted handshake carrying a
/// hand-built certificate is parsed back into the same subject/SAN data the
/// fixture was built with.
#[test]
fn connect_surfaces_a_certificate_that_parses_and_matches_its_hostname() {
    let cert_der = support::build_certificate("placeholder", "Test CA", &["scanner.example.org"]);

    let server_hello = frame(0x02, &server_hello_body([0x00, 0x2F]));
    let cert_message = {
        let entry_len = (cert_der.len() as u32).to_be_bytes();
        let mut entries = entry_len[1..].to_vec();
        entries.extend_from_slice(&cert_der);
        let list_len = (entries.len() as u32).to_be_bytes();
        let mut payload = list_len[1..].to_vec();
        payload.extend_from_slice(&entries);
        frame(0x0B, &payload)
    };
    let server_hello_done = frame(0x0E, &[]);

    let mut messages = Vec::new();
    messages.extend(server_hello);
    messages.extend(cert_message);
    messages.extend(server_hello_done);

    let mut transport = ScriptedTransport::with_response(handshake_record(&messages));

    let mut session = ScanSession::default();
    session.set_client_version(ProtocolVersion::TLS_1_2);
    session.connect(&mut transport).unwrap();

    assert_eq!(session.chosen_cipher_suite().unwrap().id, [0x00, 0x2F]);
    let chain = session.server_certificates();
    assert_eq!(chain.len(), 1);

    let cert = Certificate::parse(&chain[0]).unwrap();
    assert!(cert.hostname_matches("scanner.example.org"));
    assert!(!cert.hostname_matches("other.org"));
}
