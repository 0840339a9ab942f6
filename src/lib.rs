#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # tls-sak
//!
//! A client-side TLS posture scanner: it opens a TCP connection, drives one
//! or more partial TLS handshakes against the peer, and reports what the
//! peer is willing to negotiate — protocol version, cipher suite, compression
//! method, and certificate chain — without ever completing a handshake or
//! exchanging application data.
//!
//! The crate is organized bottom-up:
//!
//! - [`asn1`] is a small BER/DER engine: tag/length decoding and a
//!   schema-driven `SEQUENCE` reader, independent of any particular grammar.
//! - [`x509`] builds the RFC 5280 certificate grammar on top of `asn1`:
//!   parsing a DER certificate into [`x509::Certificate`], checking validity
//!   windows and hostnames, and verifying a PKCS#1 v1.5 RSA signature against
//!   an issuer's public key.
//! - [`tls`] is the record/handshake wire codec: framing, `ClientHello` /
//!   `ServerHello` / `Certificate` messages, and alerts.
//! - [`transport`] abstracts the byte stream a handshake runs over, so the
//!   codec and scan driver can be exercised against a scripted transport in
//!   tests as well as a real [`transport::TcpTransport`].
//! - [`registry`] holds the cipher-suite and compression-method tables the
//!   scanner negotiates from.
//! - [`scan`] is the driver built on the above: [`scan::ScanSession`] runs one
//!   handshake, and the free functions in that module run the repeated
//!   handshakes that make up cipher-suite enumeration, server/client
//!   honor-order detection, and certificate retrieval.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tls_sak::scan;
//! use tls_sak::tls::ProtocolVersion;
//! use tls_sak::transport::{TcpTransport, Transport};
//!
//! # fn main() -> Result<(), tls_sak::Error> {
//! let suites = scan::enumerate_cipher_suites(
//!     || Ok(Box::new(TcpTransport::connect("example.com:443")?) as Box<dyn Transport>),
//!     ProtocolVersion::TLS_1_2,
//! )?;
//! for suite in &suites {
//!     println!("{}", suite.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Scope
//!
//! This crate never completes a handshake, verifies a chain against a trust
//! store, or sends application data — it is a probe, not a client. See
//! `SPEC_FULL.md` for the full list of non-goals.

pub mod asn1;
pub mod pem;
pub mod registry;
pub mod scan;
pub mod stream;
pub mod tls;
pub mod transport;
pub mod x509;

mod error;

pub use self::error::{Error, Result};
