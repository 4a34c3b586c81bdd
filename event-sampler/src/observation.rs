//! Read-only observation context consumed by the metadata builder.

use crate::coords::SkyPos;
use gammasim_common::{Mjd, SECONDS_PER_DAY, Seconds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pointing, time span, live time and instrument identification for one
/// observation. `aeff_meta` carries the effective-area header strings the
/// calibration keywords are parsed from (`CBDn0001`, `TELESCOP`,
/// `INSTRUME`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub obs_id: u32,
    pub tstart: Mjd,
    pub tstop: Mjd,
    /// Pointing direction in ICRS degrees.
    pub pointing: SkyPos,
    pub livetime: Seconds,
    pub aeff_meta: BTreeMap<String, String>,
}

impl Observation {
    /// Wall-clock observation duration in seconds.
    pub fn ontime(&self) -> Seconds {
        (self.tstop - self.tstart) * SECONDS_PER_DAY
    }

    /// Fraction of the observation lost to dead time, `1 - livetime/ontime`.
    pub fn dead_time_fraction(&self) -> f64 {
        let ontime = self.ontime();
        if ontime > 0.0 {
            1.0 - self.livetime / ontime
        } else {
            0.0
        }
    }
}
