use crate::asn1::{self, tag, ObjectIdentifier};
use crate::error::Error;
use crate::stream::{SliceStream, Stream};

/// `Extension ::= SEQUENCE { extnID OBJECT IDENTIFIER, critical BOOLEAN
/// DEFAULT FALSE, extnValue OCTET STRING }`
#[derive(Debug, Clone)]
pub struct Extension {
    pub extn_id: ObjectIdentifier,
    pub critical: bool,
    pub extn_value: Vec<u8>,
}

impl Extension {
    pub(crate) fn parse(stream: &mut dyn Stream) -> Result<Extension, Error> {
        let tlv = asn1::read_tlv(stream)?;
        if tlv.tag != tag::SEQUENCE {
            return Err(Error::parse("invalid tag for Extension"));
        }
        let mut inner = SliceStream::new(tlv.content);
        let mut seq = asn1::SequenceReader::new(&mut inner);
        let extn_id = seq.required(tag::OBJECT_IDENTIFIER, "extnID", |t| {
            ObjectIdentifier::parse(&t.content)
        })?;
        let critical = seq
            .optional(tag::BOOLEAN, "critical", |t| asn1::parse_boolean(&t.content))?
            .unwrap_or(false);
        let extn_value = seq.required(tag::OCTET_STRING, "extnValue", |t| Ok(t.content))?;
        Ok(Extension {
            extn_id,
            critical,
            extn_value,
        })
    }

    /// Decodes `extnValue` as a `subjectAltName` payload, if this extension
    /// carries that OID.
    pub fn as_subject_alt_name(&self) -> Result<SubjectAltName, Error> {
        SubjectAltName::parse_der(&self.extn_value)
    }
}

/// `GeneralName ::= CHOICE { …, rfc822Name [1] IA5String, dNSName [2]
/// IA5String, … }` — restricted to the two alternatives this crate's
/// hostname matching cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralName {
    Rfc822Name(String),
    DnsName(String),
}

/// `SubjectAltName ::= GeneralNames ::= SEQUENCE OF GeneralName`
#[derive(Debug, Clone, Default)]
pub struct SubjectAltName {
    pub names: Vec<GeneralName>,
}

impl SubjectAltName {
    const TAG_RFC822_NAME: u8 = asn1::tag::context_implicit(1);
    const TAG_DNS_NAME: u8 = asn1::tag::context_implicit(2);

    fn parse_der(der: &[u8]) -> Result<SubjectAltName, Error> {
        let mut stream = SliceStream::new(der.to_vec());
        let outer = asn1::read_tlv(&mut stream)?;
        if outer.tag != tag::SEQUENCE {
            return Err(Error::parse("invalid tag for SubjectAltName (GeneralNames)"));
        }
        let names = asn1::parse_repeated(outer.content, Self::parse_one)?;
        Ok(SubjectAltName {
            names: names.into_iter().flatten().collect(),
        })
    }

    fn parse_one(stream: &mut dyn Stream) -> Result<Option<GeneralName>, Error> {
        let mut markable = crate::stream::Markable::new(stream);
        if let Some(tlv) = asn1::try_read_tlv(&mut markable, Self::TAG_RFC822_NAME)? {
            let s = String::from_utf8(tlv.content)
                .map_err(|_| Error::parse("rfc822Name is not valid UTF-8"))?;
            return Ok(Some(GeneralName::Rfc822Name(s)));
        }
        if let Some(tlv) = asn1::try_read_tlv(&mut markable, Self::TAG_DNS_NAME)? {
            let s = String::from_utf8(tlv.content)
                .map_err(|_| Error::parse("dNSName is not valid UTF-8"))?;
            return Ok(Some(GeneralName::DnsName(s)));
        }
        // Any other GeneralName alternative: skip it without interpreting.
        let tlv = asn1::read_tlv(&mut markable)?;
        let _ = tlv;
        Ok(None)
    }

    /// The union of `rfc822Name` and `dNSName` values, the set this crate's
    /// hostname matching draws from.
    pub fn host_strings(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::DnsName(s) => Some(s.as_str()),
            GeneralName::Rfc822Name(_) => None,
        })
    }
}
