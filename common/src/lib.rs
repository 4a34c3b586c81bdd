pub mod time;

/// Integer tag identifying which model component generated an event.
pub type ModelId = i32;
pub type EventId = u64;

/// Modified Julian Date, in days.
pub type Mjd = f64;
pub type Degrees = f64;
pub type TeV = f64;
pub type Seconds = f64;

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// `MC_ID` value reserved for background events. Source components are
/// tagged with their 1-based model index.
pub const MC_ID_BACKGROUND: ModelId = 0;

/// Elapsed seconds between an instant and a reference epoch, both in MJD.
pub fn seconds_since(mjd: Mjd, reference: Mjd) -> Seconds {
    (mjd - reference) * SECONDS_PER_DAY
}
