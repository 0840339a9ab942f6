use std::{error::Error as StdError, fmt, io};

use crate::tls::{AlertDescription, AlertLevel};

/// A `Result` alias where the `Err` case is `tls_sak::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// A boxed error type that can be used for dynamic error handling.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The errors that may occur while parsing ASN.1/X.509 data or driving a TLS
/// handshake.
///
/// `Error` is deliberately opaque: match on the `is_*` predicates rather than
/// the (private) `Kind`, so new failure modes can be added without breaking
/// callers.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    context: Vec<String>,
    source: Option<BoxError>,
}

impl Error {
    fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                context: Vec::new(),
                source: source.map(Into::into),
            }),
        }
    }

    /// A malformed BER/ASN.1 element or TLS frame.
    pub(crate) fn parse<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::Parse, Some(e))
    }

    /// A well-formed but unexpected message.
    pub(crate) fn protocol<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::Protocol, Some(e))
    }

    /// The peer sent a TLS alert.
    pub(crate) fn alert(level: AlertLevel, description: AlertDescription) -> Error {
        Error::new(Kind::Alert(level, description), None::<Error>)
    }

    /// A transport (socket) failure.
    pub(crate) fn transport<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::Transport, Some(e))
    }

    /// An opaque message type the encoder does not support.
    pub(crate) fn not_implemented<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::NotImplemented, Some(e))
    }

    /// Pushes the name of an enclosing element onto the context trail.
    ///
    /// Parsers call this as a parse error bubbles out of nested SEQUENCE /
    /// CHOICE handlers, so the final message reads e.g.
    /// `invalid tag: got 0x04, want 0x02 (in serialNumber, in tbsCertificate, in Certificate)`.
    pub(crate) fn with_context(mut self, element: impl Into<String>) -> Self {
        self.inner.context.push(element.into());
        self
    }

    /// Returns true if the error is a malformed BER/ASN.1 element or TLS frame.
    pub fn is_parse_error(&self) -> bool {
        matches!(self.inner.kind, Kind::Parse)
    }

    /// Returns true if the error is a well-formed but unexpected message.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self.inner.kind, Kind::Protocol)
    }

    /// Returns true if the peer sent a TLS alert.
    pub fn is_alert(&self) -> bool {
        matches!(self.inner.kind, Kind::Alert(_, _))
    }

    /// Returns the alert level/description, if this error was caused by a
    /// received TLS alert.
    pub fn alert_description(&self) -> Option<(AlertLevel, AlertDescription)> {
        match self.inner.kind {
            Kind::Alert(level, description) => Some((level, description)),
            _ => None,
        }
    }

    /// Returns true if the peer's alert was `handshake_failure` — the scan
    /// driver treats this as "no remaining candidate is acceptable" rather
    /// than a hard abort.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::Alert(_, AlertDescription::HandshakeFailure)
        )
    }

    /// Returns true if the error is a socket-level failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport)
    }

    /// Returns true if the error is related to a timeout.
    pub fn is_timeout(&self) -> bool {
        let mut source = self.source();
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if io.kind() == io::ErrorKind::TimedOut {
                    return true;
                }
            }
            source = err.source();
        }
        false
    }

    /// Returns true if the error is an opaque message type the encoder does
    /// not support.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self.inner.kind, Kind::NotImplemented)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut builder = f.debug_struct("tls_sak::Error");
        builder.field("kind", &self.inner.kind);
        if !self.inner.context.is_empty() {
            builder.field("context", &self.inner.context);
        }
        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner.kind {
            Kind::Parse => f.write_str("malformed ASN.1 or TLS frame")?,
            Kind::Protocol => f.write_str("unexpected protocol message")?,
            Kind::Alert(level, description) => {
                write!(f, "TLS alert: [{level}] {description}")?
            }
            Kind::Transport => f.write_str("transport error")?,
            Kind::NotImplemented => f.write_str("not implemented")?,
        };

        for element in &self.inner.context {
            write!(f, " (in {element})")?;
        }

        if let Some(e) = &self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::transport(e)
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    Parse,
    Protocol,
    Alert(AlertLevel, AlertDescription),
    Transport,
    NotImplemented,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn error_is_send_and_sync() {
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn context_trail_accumulates_innermost_first() {
        let err = Error::parse("invalid tag")
            .with_context("serialNumber")
            .with_context("tbsCertificate");
        let rendered = err.to_string();
        assert!(rendered.contains("in serialNumber"));
        assert!(rendered.contains("in tbsCertificate"));
    }

    #[test]
    fn handshake_failure_alert_is_non_fatal() {
        let err = Error::alert(AlertLevel::Fatal, AlertDescription::HandshakeFailure);
        assert!(err.is_alert());
        assert!(err.is_handshake_failure());

        let other = Error::alert(AlertLevel::Fatal, AlertDescription::UnexpectedMessage);
        assert!(!other.is_handshake_failure());
    }

    #[test]
    fn timeout_is_detected_through_source_chain() {
        let io = io::Error::from(io::ErrorKind::TimedOut);
        let err = Error::transport(io);
        assert!(err.is_timeout());
    }
}
