//! Boundary adapter from the external `YYYY-MM-DD HH:MM` text form to a
//! comparable instant.
//!
//! Everything past this module works on [`Timestamp`] only. All timestamps are
//! interpreted in UTC, both when stored and when compared.

use core::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// `chrono` format matching the accepted text form (minute resolution).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Shape of an accepted timestamp: `d` is an ASCII digit, anything else is literal.
const SHAPE: &[u8; 16] = b"dddd-dd-dd dd:dd";

/// A point in time at minute resolution, totally ordered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timestamp(s)
    }
}

/// Parse `YYYY-MM-DD HH:MM` into a [`Timestamp`].
///
/// Every field must be zero-padded and nothing may surround the value; chrono
/// alone would accept `2020-1-1 9:05`, so the shape is checked first.
pub fn parse_timestamp(text: &str) -> DomainResult<Timestamp> {
    let bytes = text.as_bytes();
    if bytes.len() != SHAPE.len() {
        return Err(DomainError::malformed_timestamp(
            text,
            "expected the form YYYY-MM-DD HH:MM",
        ));
    }

    let shape_ok = bytes.iter().zip(SHAPE.iter()).all(|(b, s)| match s {
        b'd' => b.is_ascii_digit(),
        lit => b == lit,
    });
    if !shape_ok {
        return Err(DomainError::malformed_timestamp(
            text,
            "expected the form YYYY-MM-DD HH:MM",
        ));
    }

    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|e| DomainError::malformed_timestamp(text, e.to_string()))?;

    Ok(Timestamp(naive.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use proptest::prelude::*;

    #[test]
    fn parses_minute_resolution_in_utc() {
        let ts = parse_timestamp("2020-01-01 10:34").unwrap();
        let dt = ts.as_datetime();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2020, 1, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 34, 0));
        assert_eq!(ts.to_string(), "2020-01-01 10:34");
    }

    #[test]
    fn rejects_wrong_shapes() {
        for bad in [
            "",
            "2020-01-01",
            "2020-01-01 10:34:00",
            "2020-1-01 10:34",
            "2020-01-01 9:05",
            "2020-01-01T10:34",
            " 2020-01-01 10:34",
            "2020-01-01 10:34 ",
            "2020/01/01 10:34",
            "abcd-ef-gh ij:kl",
        ] {
            let err = parse_timestamp(bad).unwrap_err();
            assert!(
                matches!(err, DomainError::MalformedTimestamp { ref input, .. } if input == bad),
                "expected MalformedTimestamp for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        for bad in ["2020-02-30 10:00", "2021-02-29 10:00", "2020-13-01 10:00", "2020-01-01 24:00", "2020-01-01 10:60"] {
            assert!(parse_timestamp(bad).is_err(), "{bad} should not parse");
        }
        assert!(parse_timestamp("2020-02-29 23:59").is_ok());
    }

    #[test]
    fn from_str_uses_the_same_rules() {
        let ts: Timestamp = "2020-01-01 10:39".parse().unwrap();
        assert_eq!(ts, parse_timestamp("2020-01-01 10:39").unwrap());
        assert!("2020-01-01 10:39:00".parse::<Timestamp>().is_err());
    }

    #[test]
    fn from_datetime_matches_the_parsed_form() {
        let dt = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(10, 34, 0))
            .unwrap()
            .and_utc();
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts, parse_timestamp("2020-01-01 10:34").unwrap());
        assert_eq!(*ts.as_datetime(), dt);
        assert_eq!(ts.to_string(), "2020-01-01 10:34");
    }

    fn any_minute() -> impl Strategy<Value = String> {
        (1970u32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_map(|(y, mo, d, h, mi)| {
            format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}")
        })
    }

    proptest! {
        /// Property: instant ordering agrees with the lexical ordering of the
        /// zero-padded text form.
        #[test]
        fn ordering_matches_text_ordering(a in any_minute(), b in any_minute()) {
            let ta = parse_timestamp(&a).unwrap();
            let tb = parse_timestamp(&b).unwrap();
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
        }
    }
}
