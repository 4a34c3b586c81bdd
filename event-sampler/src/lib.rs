//! Event sampling for gamma-ray astronomical observations.
//!
//! Given a model of sky sources, instrument response (point-spread
//! function, energy dispersion) and a background rate map, the sampler
//! draws a synthetic list of detected events consistent with Poisson
//! statistics and the responses, and attaches the gamma-astro data format
//! header mapping required downstream.
//!
//! The entry point is [`sampler::MapDatasetEventSampler`], which consumes a
//! [`dataset::MapDataset`] and an [`observation::Observation`].

pub mod caldb;
pub mod coords;
pub mod dataset;
pub mod error;
pub mod gti;
pub mod map;
pub mod meta;
pub mod observation;
pub mod response;
pub mod sampler;
pub mod table;
pub mod temporal;

pub use dataset::{IrfCorrections, MapDataset, SkyModel};
pub use error::SamplerError;
pub use sampler::MapDatasetEventSampler;
pub use table::{EventList, EventTable};
