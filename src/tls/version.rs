//! TLS/SSL record-layer protocol version wire bytes.

use std::fmt;

use crate::error::Error;

/// A record-layer protocol version, as carried in every TLS record header
/// and in the ClientHello/ServerHello body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion(pub u8, pub u8);

impl ProtocolVersion {
    pub const SSL_3_0: ProtocolVersion = ProtocolVersion(0x03, 0x00);
    pub const TLS_1_0: ProtocolVersion = ProtocolVersion(0x03, 0x01);
    pub const TLS_1_1: ProtocolVersion = ProtocolVersion(0x03, 0x02);
    pub const TLS_1_2: ProtocolVersion = ProtocolVersion(0x03, 0x03);
    pub const TLS_1_3: ProtocolVersion = ProtocolVersion(0x03, 0x04);

    pub(crate) fn from_wire(major: u8, minor: u8) -> ProtocolVersion {
        ProtocolVersion(major, minor)
    }

    pub(crate) fn to_wire(self) -> [u8; 2] {
        [self.0, self.1]
    }

    /// A human name for the well-known versions, or a hex fallback.
    pub fn name(&self) -> String {
        match *self {
            ProtocolVersion::SSL_3_0 => "SSLv3".to_string(),
            ProtocolVersion::TLS_1_0 => "TLSv1.0".to_string(),
            ProtocolVersion::TLS_1_1 => "TLSv1.1".to_string(),
            ProtocolVersion::TLS_1_2 => "TLSv1.2".to_string(),
            ProtocolVersion::TLS_1_3 => "TLSv1.3".to_string(),
            ProtocolVersion(major, minor) => format!("unknown ({major:#04x}{minor:02x})"),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name())
    }
}

pub(crate) fn read_version(bytes: &[u8]) -> Result<ProtocolVersion, Error> {
    match bytes {
        [major, minor] => Ok(ProtocolVersion::from_wire(*major, *minor)),
        _ => Err(Error::parse("truncated protocol version field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_well_known_versions() {
        assert_eq!(ProtocolVersion::TLS_1_2.name(), "TLSv1.2");
        assert_eq!(ProtocolVersion::TLS_1_3.to_wire(), [0x03, 0x04]);
    }

    #[test]
    fn unknown_version_falls_back_to_hex() {
        assert!(ProtocolVersion(0x07, 0x07).name().starts_with("unknown"));
    }
}
