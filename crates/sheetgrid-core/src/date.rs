//! Serial date conversion
//!
//! Spreadsheet dates are stored as plain numbers: whole days since
//! 1899-12-30 (the OLE Automation epoch) plus the time of day as a
//! fraction. 1900-01-01 is serial 2; the phantom 1900-02-29 of the
//! 1900 date system is not modelled.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Days from 1899-12-30 to 1970-01-01
const UNIX_EPOCH_SERIAL: i64 = 25_569;

/// Smallest serial accepted (0100-01-01)
pub const MIN_SERIAL: f64 = -657_435.0;

/// Largest serial accepted (9999-12-31 23:59:59.999)
pub const MAX_SERIAL: f64 = 2_958_466.0;

/// Day zero of the serial date system
pub fn epoch() -> NaiveDateTime {
    // NaiveDateTime::default() is 1970-01-01 00:00:00
    NaiveDateTime::default() - Duration::days(UNIX_EPOCH_SERIAL)
}

/// Convert a date-time to its serial number
pub fn to_serial(value: NaiveDateTime) -> f64 {
    let millis = value.signed_duration_since(epoch()).num_milliseconds();
    millis as f64 / MILLIS_PER_DAY as f64
}

/// Convert a calendar date (midnight) to its serial number
pub fn date_to_serial(value: NaiveDate) -> f64 {
    to_serial(value.and_time(chrono::NaiveTime::MIN))
}

/// Convert a serial number back to a date-time, rounded to the millisecond
pub fn from_serial(serial: f64) -> Result<NaiveDateTime> {
    if !serial.is_finite() || !(MIN_SERIAL..MAX_SERIAL).contains(&serial) {
        return Err(Error::InvalidDate(format!("serial {} out of range", serial)));
    }

    let days = serial.floor();
    let mut day_count = days as i64;
    let mut millis = ((serial - days) * MILLIS_PER_DAY as f64).round() as i64;
    if millis >= MILLIS_PER_DAY {
        day_count += 1;
        millis -= MILLIS_PER_DAY;
    }

    epoch()
        .checked_add_signed(Duration::days(day_count))
        .and_then(|d| d.checked_add_signed(Duration::milliseconds(millis)))
        .ok_or_else(|| Error::InvalidDate(format!("serial {} out of range", serial)))
}

/// Parse an ISO-8601 date or date-time (`2024-03-01`, `2024-03-01T08:30:00`)
pub fn parse_iso(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    const DATE_TIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| Error::InvalidDate(text.to_string()))
}
