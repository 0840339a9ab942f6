//! RFC 5280 certificate grammar, built on the [`crate::asn1`] engine.

mod cert;
mod extensions;
mod name;

pub use cert::Certificate;
pub use extensions::{Extension, GeneralName, SubjectAltName};
pub use name::{AttributeTypeAndValue, DistinguishedName, RelativeDistinguishedName};

use crate::asn1::{self, tag, Any, BitString, ObjectIdentifier};
use crate::error::Error;
use crate::stream::SliceStream;

/// `AlgorithmIdentifier ::= SEQUENCE { algorithm OBJECT IDENTIFIER,
/// parameters ANY DEFINED BY algorithm OPTIONAL }`
#[derive(Debug, Clone)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<Any>,
}

impl AlgorithmIdentifier {
    pub(crate) fn parse_content(content: Vec<u8>) -> Result<AlgorithmIdentifier, Error> {
        let mut stream = SliceStream::new(content);
        let mut seq = asn1::SequenceReader::new(&mut stream);
        let algorithm = seq.required(tag::OBJECT_IDENTIFIER, "algorithm", |tlv| {
            ObjectIdentifier::parse(&tlv.content)
        })?;
        let parameters = seq.optional_any("parameters")?;
        Ok(AlgorithmIdentifier {
            algorithm,
            parameters,
        })
    }

    pub(crate) fn parse_tlv(tlv: asn1::Tlv) -> Result<AlgorithmIdentifier, Error> {
        if tlv.tag != tag::SEQUENCE {
            return Err(Error::parse(format!(
                "invalid tag: got {:#04x}, want {:#04x} (AlgorithmIdentifier)",
                tlv.tag,
                tag::SEQUENCE
            )));
        }
        AlgorithmIdentifier::parse_content(tlv.content)
    }
}

/// `Validity ::= SEQUENCE { notBefore Time, notAfter Time }`
///
/// `Time ::= CHOICE { utcTime UTCTime, generalTime GeneralizedTime }`
#[derive(Debug, Clone)]
pub struct Validity {
    pub not_before: asn1::Asn1Time,
    pub not_after: asn1::Asn1Time,
}

const TIME_ALTERNATIVES: &[(u8, fn(asn1::Tlv) -> Result<asn1::Asn1Time, Error>)] = &[
    (tag::UTC_TIME, time_utc),
    (tag::GENERALIZED_TIME, time_generalized),
];

fn time_utc(tlv: asn1::Tlv) -> Result<asn1::Asn1Time, Error> {
    Ok(asn1::Asn1Time::Utc(tlv.content))
}

fn time_generalized(tlv: asn1::Tlv) -> Result<asn1::Asn1Time, Error> {
    Ok(asn1::Asn1Time::Generalized(tlv.content))
}

impl Validity {
    pub(crate) fn parse_content(content: Vec<u8>) -> Result<Validity, Error> {
        let mut stream = SliceStream::new(content);
        let mut seq = asn1::SequenceReader::new(&mut stream);
        let not_before = seq.choice("notBefore", TIME_ALTERNATIVES)?;
        let not_after = seq.choice("notAfter", TIME_ALTERNATIVES)?;
        Ok(Validity {
            not_before,
            not_after,
        })
    }
}

/// `SubjectPublicKeyInfo ::= SEQUENCE { algorithm AlgorithmIdentifier,
/// subjectPublicKey BIT STRING }`
#[derive(Debug, Clone)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: AlgorithmIdentifier,
    pub subject_public_key: BitString,
}

impl SubjectPublicKeyInfo {
    pub(crate) fn parse_content(content: Vec<u8>) -> Result<SubjectPublicKeyInfo, Error> {
        let mut stream = SliceStream::new(content);
        let mut seq = asn1::SequenceReader::new(&mut stream);
        let algorithm = seq.required(tag::SEQUENCE, "algorithm", AlgorithmIdentifier::parse_content)?;
        let subject_public_key =
            seq.required(tag::BIT_STRING, "subjectPublicKey", |tlv| BitString::parse(tlv.content))?;
        Ok(SubjectPublicKeyInfo {
            algorithm,
            subject_public_key,
        })
    }
}
