//! Good time interval bookkeeping.

use crate::error::GtiError;
use gammasim_common::{Mjd, SECONDS_PER_DAY, Seconds};

/// The single valid time span of an observation, with the reference epoch
/// event times are expressed against.
#[derive(Debug, Clone, PartialEq)]
pub struct Gti {
    time_start: Mjd,
    time_stop: Mjd,
    time_ref: Mjd,
    /// Time scale label carried into the `TIMESYS` header keyword.
    scale: String,
}

impl Gti {
    pub fn new(
        time_start: Mjd,
        time_stop: Mjd,
        time_ref: Mjd,
        scale: impl Into<String>,
    ) -> Result<Self, GtiError> {
        if !(time_start.is_finite() && time_stop.is_finite() && time_ref.is_finite()) {
            return Err(GtiError::NonFiniteBound);
        }
        if time_stop < time_start {
            return Err(GtiError::InvertedInterval {
                start: time_start,
                stop: time_stop,
            });
        }
        Ok(Self {
            time_start,
            time_stop,
            time_ref,
            scale: scale.into(),
        })
    }

    pub fn time_start(&self) -> Mjd {
        self.time_start
    }

    pub fn time_stop(&self) -> Mjd {
        self.time_stop
    }

    pub fn time_ref(&self) -> Mjd {
        self.time_ref
    }

    pub fn scale(&self) -> &str {
        &self.scale
    }

    /// Total exposure duration in seconds.
    pub fn time_sum(&self) -> Seconds {
        (self.time_stop - self.time_start) * SECONDS_PER_DAY
    }
}
