use crate::asn1::{self, tag, Any, DirectoryString, ObjectIdentifier};
use crate::error::Error;
use crate::stream::{SliceStream, Stream};

/// `AttributeTypeAndValue ::= SEQUENCE { type OBJECT IDENTIFIER, value ANY }`
#[derive(Debug, Clone)]
pub struct AttributeTypeAndValue {
    pub attr_type: ObjectIdentifier,
    pub value: Any,
}

impl AttributeTypeAndValue {
    fn parse(stream: &mut dyn Stream) -> Result<AttributeTypeAndValue, Error> {
        let tlv = asn1::read_tlv(stream)?;
        if tlv.tag != tag::SEQUENCE {
            return Err(Error::parse("invalid tag for AttributeTypeAndValue"));
        }
        let mut inner = SliceStream::new(tlv.content);
        let mut seq = asn1::SequenceReader::new(&mut inner);
        let attr_type = seq.required(tag::OBJECT_IDENTIFIER, "type", |t| {
            ObjectIdentifier::parse(&t.content)
        })?;
        let value = seq
            .optional_any("value")?
            .ok_or_else(|| Error::parse("AttributeTypeAndValue missing value"))?;
        Ok(AttributeTypeAndValue { attr_type, value })
    }

    /// Decodes `value` as a `DirectoryString`, the shape every attribute
    /// type this crate cares about (CN, C, O) actually uses.
    pub fn value_as_directory_string(&self) -> Result<DirectoryString, Error> {
        asn1::strings_parse_by_tag(self.value.tag, self.value.content.clone())
    }
}

/// `RelativeDistinguishedName ::= SET SIZE (1..MAX) OF
/// AttributeTypeAndValue`
#[derive(Debug, Clone)]
pub struct RelativeDistinguishedName(pub Vec<AttributeTypeAndValue>);

impl RelativeDistinguishedName {
    fn parse(stream: &mut dyn Stream) -> Result<RelativeDistinguishedName, Error> {
        let tlv = asn1::read_tlv(stream)?;
        if tlv.tag != tag::SET {
            return Err(Error::parse("invalid tag for RelativeDistinguishedName"));
        }
        let attrs = asn1::parse_repeated(tlv.content, AttributeTypeAndValue::parse)?;
        if attrs.is_empty() {
            return Err(Error::parse("RelativeDistinguishedName must have at least one attribute"));
        }
        Ok(RelativeDistinguishedName(attrs))
    }
}

/// The resolved form of `Name` (`RDNSequence`), a walkable list of RDNs.
#[derive(Debug, Clone, Default)]
pub struct DistinguishedName(pub Vec<RelativeDistinguishedName>);

impl DistinguishedName {
    pub(crate) fn parse_content(content: Vec<u8>) -> Result<DistinguishedName, Error> {
        let rdns = asn1::parse_repeated(content, RelativeDistinguishedName::parse)?;
        Ok(DistinguishedName(rdns))
    }

    pub(crate) fn parse_tlv(tlv: asn1::Tlv) -> Result<DistinguishedName, Error> {
        if tlv.tag != tag::SEQUENCE {
            return Err(Error::parse("invalid tag for Name (RDNSequence)"));
        }
        DistinguishedName::parse_content(tlv.content)
    }

    /// The first attribute value matching `attr_type`, e.g. `CN`.
    pub fn get(&self, attr_type: &ObjectIdentifier) -> Option<DirectoryString> {
        for rdn in &self.0 {
            for atv in &rdn.0 {
                if &atv.attr_type == attr_type {
                    return atv.value_as_directory_string().ok();
                }
            }
        }
        None
    }

    /// Renders as `/`-separated `attr=value` pairs, resolving attribute
    /// OIDs to their short names when known.
    pub fn to_display_string(&self) -> String {
        let mut parts = Vec::new();
        for rdn in &self.0 {
            for atv in &rdn.0 {
                let name = asn1::well_known_oid_name(&atv.attr_type)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| atv.attr_type.to_string());
                if let Ok(value) = atv.value_as_directory_string() {
                    parts.push(format!("{name}={}", value.as_str()));
                }
            }
        }
        parts.join("/")
    }
}
