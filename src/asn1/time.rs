use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::Error;

/// The `Time` CHOICE used by `Validity`: `UTCTime` (two-digit year) or
/// `GeneralizedTime` (four-digit year).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asn1Time {
    Utc(Vec<u8>),
    Generalized(Vec<u8>),
}

impl Asn1Time {
    /// Converts to a UTC timestamp.
    ///
    /// `UTCTime` is `YYMMDDHHMMSSZ`; per RFC 5280 §4.1.2.5.1 a two-digit
    /// year `YY >= 50` means `19YY`, otherwise `20YY`. `GeneralizedTime` is
    /// `YYYYMMDDHHMMSSZ`. Both forms are required here to carry seconds and
    /// the `Z` (UTC) suffix; fractional seconds and local-offset forms are
    /// not accepted.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, Error> {
        match self {
            Asn1Time::Utc(raw) => parse_utc_time(raw),
            Asn1Time::Generalized(raw) => parse_generalized_time(raw),
        }
    }
}

fn ascii_digits(raw: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(raw).map_err(|_| Error::parse("time value is not ASCII"))
}

fn parse_utc_time(raw: &[u8]) -> Result<DateTime<Utc>, Error> {
    let s = ascii_digits(raw)?;
    let s = s
        .strip_suffix('Z')
        .ok_or_else(|| Error::parse("UTCTime must end in 'Z'"))?;
    if s.len() != 12 {
        return Err(Error::parse("UTCTime must be YYMMDDHHMMSS'Z'"));
    }
    let yy: i32 = s[0..2].parse().map_err(|_| Error::parse("invalid UTCTime year"))?;
    let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
    build_datetime(year, &s[2..])
}

fn parse_generalized_time(raw: &[u8]) -> Result<DateTime<Utc>, Error> {
    let s = ascii_digits(raw)?;
    let s = s
        .strip_suffix('Z')
        .ok_or_else(|| Error::parse("GeneralizedTime must end in 'Z'"))?;
    if s.len() != 14 {
        return Err(Error::parse("GeneralizedTime must be YYYYMMDDHHMMSS'Z'"));
    }
    let year: i32 = s[0..4]
        .parse()
        .map_err(|_| Error::parse("invalid GeneralizedTime year"))?;
    build_datetime(year, &s[4..])
}

/// `rest` is `MMDDHHMMSS`, 10 ASCII digits.
fn build_datetime(year: i32, rest: &str) -> Result<DateTime<Utc>, Error> {
    if rest.len() != 10 {
        return Err(Error::parse("malformed month/day/time field"));
    }
    let field = |r: &str| r.parse::<u32>().map_err(|_| Error::parse("non-numeric time field"));
    let month = field(&rest[0..2])?;
    let day = field(&rest[2..4])?;
    let hour = field(&rest[4..6])?;
    let minute = field(&rest[6..8])?;
    let second = field(&rest[8..10])?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::parse("invalid calendar date in certificate timestamp"))?;
    let time = date
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| Error::parse("invalid time of day in certificate timestamp"))?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(
        NaiveDateTime::new(date, time.time()),
        Utc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_time_before_2000_pivot() {
        let t = Asn1Time::Utc(b"991231235959Z".to_vec());
        let dt = t.to_datetime().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "1999-12-31 23:59:59");
    }

    #[test]
    fn utc_time_after_2000_pivot() {
        let t = Asn1Time::Utc(b"300101000000Z".to_vec());
        let dt = t.to_datetime().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2030-01-01 00:00:00");
    }

    #[test]
    fn generalized_time_parses_four_digit_year() {
        let t = Asn1Time::Generalized(b"20491231235959Z".to_vec());
        let dt = t.to_datetime().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2049-12-31");
    }

    #[test]
    fn rejects_missing_z_suffix() {
        let t = Asn1Time::Utc(b"991231235959".to_vec());
        assert!(t.to_datetime().is_err());
    }
}
