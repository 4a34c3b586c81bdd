//! Calendar conversion for Modified Julian Dates.
//!
//! Header keywords such as `DATE-OBS` carry calendar strings derived from
//! MJD epochs. Leap seconds are ignored; the calendar string reflects the
//! MJD value as-is, in whatever scale the GTI declares.

use crate::{Mjd, SECONDS_PER_DAY};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MjdConversionError {
    #[error("MJD {0} is outside the representable calendar range")]
    OutOfRange(Mjd),
}

/// Calendar instant of the MJD origin, 1858-11-17T00:00:00.
fn mjd_epoch() -> DateTime<Utc> {
    let naive = NaiveDate::from_ymd_opt(1858, 11, 17)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("the MJD origin is a valid calendar date");
    DateTime::from_naive_utc_and_offset(naive, Utc)
}

pub fn mjd_to_datetime(mjd: Mjd) -> Result<DateTime<Utc>, MjdConversionError> {
    if !mjd.is_finite() {
        return Err(MjdConversionError::OutOfRange(mjd));
    }
    let millis = (mjd * SECONDS_PER_DAY * 1e3).round() as i64;
    let delta = TimeDelta::try_milliseconds(millis).ok_or(MjdConversionError::OutOfRange(mjd))?;
    mjd_epoch()
        .checked_add_signed(delta)
        .ok_or(MjdConversionError::OutOfRange(mjd))
}

/// `YYYY-MM-DD`, the `DATE-OBS`/`DATE-END` convention.
pub fn mjd_date_string(mjd: Mjd) -> Result<String, MjdConversionError> {
    Ok(mjd_to_datetime(mjd)?.format("%Y-%m-%d").to_string())
}

/// `HH:MM:SS.sss`, the `TIME-OBS`/`TIME-END` convention.
pub fn mjd_time_string(mjd: Mjd) -> Result<String, MjdConversionError> {
    Ok(mjd_to_datetime(mjd)?.format("%H:%M:%S%.3f").to_string())
}
