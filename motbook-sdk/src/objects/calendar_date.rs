//! `YYYY-MM-DD` calendar dates on the wire.
//!
//! The backend expects bare dates on requests but sometimes answers with a
//! full ISO-8601 timestamp (`2025-03-04T00:00:00.000Z`). Only the date part
//! is kept when reading.

use serde::{Deserialize, Deserializer, Serializer};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Format a date the way the backend expects it (`2025-03-04`).
pub fn format(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| {
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    })
}

/// Parse `YYYY-MM-DD`, ignoring any trailing time component.
pub fn parse(value: &str) -> Result<Date, time::error::Parse> {
    let date_part = value.get(..10).unwrap_or(value);
    Date::parse(date_part, DATE_FORMAT)
}

pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// Same as the parent module, for `Option<Date>` fields.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&super::format(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse(value).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_format_pads_month_and_day() {
        assert_eq!(format(date!(2025 - 03 - 04)), "2025-03-04");
    }

    #[test]
    fn test_parse_accepts_timestamps() {
        assert_eq!(parse("2025-03-04").unwrap(), date!(2025 - 03 - 04));
        assert_eq!(
            parse("2025-03-04T00:00:00.000Z").unwrap(),
            date!(2025 - 03 - 04)
        );
        assert!(parse("04/03/2025").is_err());
    }
}
