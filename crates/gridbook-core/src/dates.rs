//! Serial date conversion
//!
//! Cells store dates as serial day numbers counted from one of two epochs.
//! The 1900 system starts at serial 1 = 1900-01-01 and carries a historical
//! defect: serial 60 is the nonexistent 1900-02-29, so every real date from
//! March 1900 on sits one serial later than plain day counting would give.
//! The 1904 system starts at serial 0 = 1904-01-01 and has no such gap.
//! Whether a cell's number *is* a date is a property of its number format;
//! see [`crate::style::is_date_format`].

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a calendar date to its serial day number
///
/// Returns `None` for dates the serial scheme cannot express: before
/// 1900-01-01 on the 1900 system, before 1904-01-01 on the 1904 system.
pub fn date_to_serial(date: NaiveDate, date_1904: bool) -> Option<f64> {
    if date_1904 {
        let epoch = NaiveDate::from_ymd_opt(1904, 1, 1)?;
        let days = date.signed_duration_since(epoch).num_days();
        if days < 0 {
            return None;
        }
        Some(days as f64)
    } else {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 31)?;
        let mut days = date.signed_duration_since(epoch).num_days();
        if days < 1 {
            return None;
        }
        if days >= 60 {
            // the phantom leap day pushes March 1900 onward one serial up
            days += 1;
        }
        Some(days as f64)
    }
}

/// Convert a date and time of day to a fractional serial
pub fn datetime_to_serial(datetime: NaiveDateTime, date_1904: bool) -> Option<f64> {
    let days = date_to_serial(datetime.date(), date_1904)?;
    let time = datetime.time();
    let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
    Some(days + seconds / SECONDS_PER_DAY)
}

/// Convert a serial day number back to a calendar date
///
/// The fractional part is dropped. On the 1900 system the phantom serial 60
/// maps to March 1, the same day as serial 61. Negative and non-finite
/// serials return `None`.
pub fn serial_to_date(serial: f64, date_1904: bool) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let whole = serial.floor() as i64;
    let base = if date_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if whole < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.checked_add_days(Days::new(whole as u64))
}

/// Convert a fractional serial back to a date and time
///
/// The day fraction is rounded to the nearest millisecond.
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    let date = serial_to_date(serial, date_1904)?;
    let millis = ((serial - serial.floor()) * SECONDS_PER_DAY * 1_000.0).round() as i64;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    midnight.checked_add_signed(Duration::milliseconds(millis))
}
