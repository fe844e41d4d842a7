//! Canonical string forms used for file names and request keys.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{Result, WunderlogError};

/// Day-level file names.
pub const DAY_FMT: &str = "%Y-%m-%d";
/// Minute-resolution file names.
pub const DATE_FMT: &str = "%Y-%m-%dT%H-%M";
/// `DATE_FMT` without the minute, used to group snapshots by hour.
pub const HOURLY_FMT: &str = "%Y-%m-%dT%H";

const HISTORY_KEY_FMT: &str = "history_%Y%m%d";

pub fn day_stamp(day: NaiveDate) -> String {
    day.format(DAY_FMT).to_string()
}

pub fn minute_stamp(dt: NaiveDateTime) -> String {
    dt.format(DATE_FMT).to_string()
}

pub fn hour_prefix(dt: NaiveDateTime) -> String {
    dt.format(HOURLY_FMT).to_string()
}

/// Request key for one day of history, e.g. `history_20240101`.
pub fn history_key(day: NaiveDate) -> String {
    day.format(HISTORY_KEY_FMT).to_string()
}

/// Timestamp of an observation, taken from its own `date` payload.
///
/// The API sends every component as a string (`"mon": "01"`), but plain
/// numbers are accepted too.
pub fn parse_observation_date(date: &Value) -> Result<NaiveDateTime> {
    let field = |name: &str| -> Result<u32> {
        let raw = date
            .get(name)
            .ok_or_else(|| WunderlogError::InvalidObservationDate(format!("missing '{name}'")))?;
        coerce_int(raw).ok_or_else(|| {
            WunderlogError::InvalidObservationDate(format!("'{name}' is not an integer: {raw}"))
        })
    };

    let year = field("year")?;
    let month = field("mon")?;
    let day = field("mday")?;
    let hour = field("hour")?;
    let minute = field("min")?;

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| WunderlogError::InvalidObservationDate(date.to_string()))
}

fn coerce_int(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => match n.as_u64() {
            Some(n) => u32::try_from(n).ok(),
            // whole-number floats, e.g. 2024.0
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u32),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn stamps_use_dashes_throughout() {
        let when = dt(2024, 1, 1, 10, 5);

        assert_eq!(day_stamp(when.date()), "2024-01-01");
        assert_eq!(minute_stamp(when), "2024-01-01T10-05");
        assert_eq!(hour_prefix(when), "2024-01-01T10");
        assert!(minute_stamp(when).starts_with(&hour_prefix(when)));
    }

    #[test]
    fn history_key_is_compact() {
        let day = NaiveDate::from_ymd_opt(2017, 3, 9).unwrap();
        assert_eq!(history_key(day), "history_20170309");
    }

    #[test]
    fn observation_date_from_strings() {
        let date = json!({
            "year": "2024", "mon": "01", "mday": "01",
            "hour": "10", "min": "15", "tzname": "Europe/Oslo"
        });
        assert_eq!(parse_observation_date(&date).unwrap(), dt(2024, 1, 1, 10, 15));
    }

    #[test]
    fn observation_date_from_numbers() {
        let date = json!({"year": 2024, "mon": 12, "mday": 31, "hour": 23, "min": 59});
        assert_eq!(parse_observation_date(&date).unwrap(), dt(2024, 12, 31, 23, 59));
    }

    #[test]
    fn observation_date_from_whole_floats() {
        let date = json!({"year": 2024.0, "mon": 1.0, "mday": "01", "hour": 10, "min": 15.0});
        assert_eq!(parse_observation_date(&date).unwrap(), dt(2024, 1, 1, 10, 15));

        let fractional = json!({"year": 2024, "mon": 1, "mday": 1, "hour": 10, "min": 15.5});
        assert!(parse_observation_date(&fractional).is_err());
    }

    #[test]
    fn observation_date_rejects_garbage() {
        let missing = json!({"year": "2024", "mon": "01", "mday": "01", "hour": "10"});
        assert!(matches!(
            parse_observation_date(&missing),
            Err(WunderlogError::InvalidObservationDate(_))
        ));

        let out_of_range = json!({"year": "2024", "mon": "13", "mday": "01", "hour": "10", "min": "00"});
        assert!(parse_observation_date(&out_of_range).is_err());

        let not_a_number = json!({"year": "2024", "mon": "jan", "mday": "01", "hour": "10", "min": "00"});
        assert!(parse_observation_date(&not_a_number).is_err());
    }
}
