use crate::error::Error;

use super::tag;

/// The `DirectoryString` CHOICE (RFC 5280 Appendix A.1), restricted to the
/// alternatives this crate needs to read attribute values and SANs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryString {
    Printable(String),
    Utf8(String),
    Bmp(String),
}

impl DirectoryString {
    pub fn as_str(&self) -> &str {
        match self {
            DirectoryString::Printable(s) => s,
            DirectoryString::Utf8(s) => s,
            DirectoryString::Bmp(s) => s,
        }
    }

    pub fn parse_printable(content: Vec<u8>) -> Result<DirectoryString, Error> {
        Ok(DirectoryString::Printable(ascii_string(content)?))
    }

    pub fn parse_utf8(content: Vec<u8>) -> Result<DirectoryString, Error> {
        String::from_utf8(content)
            .map(DirectoryString::Utf8)
            .map_err(|_| Error::parse("UTF8String is not valid UTF-8"))
    }

    pub fn parse_bmp(content: Vec<u8>) -> Result<DirectoryString, Error> {
        if content.len() % 2 != 0 {
            return Err(Error::parse("BMPString has an odd number of octets"));
        }
        let units: Vec<u16> = content
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        let s: String = char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|_| Error::parse("BMPString contains an unpaired surrogate"))?;
        Ok(DirectoryString::Bmp(s))
    }
}

fn ascii_string(content: Vec<u8>) -> Result<String, Error> {
    if !content.is_ascii() {
        return Err(Error::parse("PrintableString/IA5String contains non-ASCII bytes"));
    }
    String::from_utf8(content).map_err(|_| Error::parse("string content is not valid ASCII"))
}

/// Parses the content of whichever string tag is actually present.
pub fn parse_by_tag(t: u8, content: Vec<u8>) -> Result<DirectoryString, Error> {
    match t {
        tag::PRINTABLE_STRING => DirectoryString::parse_printable(content),
        tag::UTF8_STRING => DirectoryString::parse_utf8(content),
        tag::BMP_STRING => DirectoryString::parse_bmp(content),
        tag::IA5_STRING => Ok(DirectoryString::Utf8(ascii_string(content)?)),
        other => Err(Error::parse(format!(
            "unsupported DirectoryString alternative: tag {other:#04x}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_round_trips() {
        let s = DirectoryString::parse_utf8(b"hello".to_vec()).unwrap();
        assert_eq!(s.as_str(), "hello");
    }

    #[test]
    fn bmp_decodes_utf16_be() {
        // "Hi" as UTF-16BE
        let bytes = vec![0x00, 0x48, 0x00, 0x69];
        let s = DirectoryString::parse_bmp(bytes).unwrap();
        assert_eq!(s.as_str(), "Hi");
    }

    #[test]
    fn printable_rejects_non_ascii() {
        assert!(DirectoryString::parse_printable(vec![0xFF]).is_err());
    }
}
