//! Field decoders for records written by older web forms.
//!
//! The backend stores whatever the form posted, so a listing can carry
//! `"quantity": "5"` or `"expireDate": "2025-06-01"`. These accept both the
//! typed shape and the form shape; serialization is left to the defaults.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u32),
    Text(String),
}

/// A `u32` sent either as a JSON number or as a numeric string.
pub(crate) mod quantity {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::NumberOrText;

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        match NumberOrText::deserialize(d)? {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid quantity {s:?}"))),
        }
    }
}

/// An RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as UTC midnight.
pub(crate) mod date {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::{DateTime, NaiveDate, Utc};

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(raw.trim()).ok_or_else(|| D::Error::custom(format!("invalid date {raw:?}")))
    }

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
    }
}
