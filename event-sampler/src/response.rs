//! Instrument response smearing.
//!
//! Both stages build the same query from an event's true position and true
//! energy, then draw the reconstructed quantity from a [`ResponseMap`].
//! Energy dispersion writes `ENERGY`; the PSF writes `RA`/`DEC`. The two
//! stages read only true-quantity columns and write disjoint reconstructed
//! columns, so they may run in either order.

use crate::{error::SamplerError, map::MapCoords, table::EventTable};
use gammasim_common::{Degrees, TeV};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Per-event query: true position and true energy, ICRS degrees and TeV.
#[derive(Debug, Clone, Copy)]
pub struct TrueCoords<'a> {
    pub ra: &'a [Degrees],
    pub dec: &'a [Degrees],
    pub energy_true: &'a [TeV],
}

impl<'a> TrueCoords<'a> {
    /// Builds the smearing query from an event table's true columns.
    pub fn from_table(events: &'a EventTable) -> Result<Self, SamplerError> {
        Ok(Self {
            ra: EventTable::column(&events.ra_true, "RA_TRUE")?,
            dec: EventTable::column(&events.dec_true, "DEC_TRUE")?,
            energy_true: EventTable::column(&events.energy_true, "ENERGY_TRUE")?,
        })
    }

    pub fn len(&self) -> usize {
        self.ra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ra.is_empty()
    }
}

/// A response map that resamples event coordinates: PSF maps return
/// reconstructed positions, energy dispersion maps reconstructed energies.
pub trait ResponseMap {
    fn sample_coord(
        &self,
        coords: &TrueCoords<'_>,
        rng: &mut StdRng,
    ) -> Result<MapCoords, SamplerError>;
}

fn check_len(expected: usize, got: usize) -> Result<(), SamplerError> {
    if expected == got {
        Ok(())
    } else {
        Err(SamplerError::ResponseLengthMismatch { expected, got })
    }
}

/// Draws a reconstructed energy per event and writes the `ENERGY` column.
pub fn apply_energy_dispersion(
    edisp: &dyn ResponseMap,
    events: &mut EventTable,
    rng: &mut StdRng,
) -> Result<(), SamplerError> {
    let reco = edisp.sample_coord(&TrueCoords::from_table(events)?, rng)?;
    let energy = reco
        .energy
        .ok_or(SamplerError::MissingResponsePayload("energy"))?;
    check_len(events.len(), energy.len())?;
    events.energy = Some(energy);
    Ok(())
}

/// Draws a reconstructed sky position per event and writes `RA`/`DEC`.
pub fn apply_psf(
    psf: &dyn ResponseMap,
    events: &mut EventTable,
    rng: &mut StdRng,
) -> Result<(), SamplerError> {
    let reco = psf.sample_coord(&TrueCoords::from_table(events)?, rng)?;
    check_len(events.len(), reco.lon.len())?;
    check_len(events.len(), reco.lat.len())?;
    events.ra = Some(reco.lon);
    events.dec = Some(reco.lat);
    Ok(())
}

/// Energy dispersion with a Gaussian migration kernel of fixed fractional
/// resolution: `E_reco ~ N(E_true, resolution * E_true)`.
#[derive(Debug, Clone, Copy)]
pub struct GaussianEdisp {
    pub resolution: f64,
}

impl ResponseMap for GaussianEdisp {
    fn sample_coord(
        &self,
        coords: &TrueCoords<'_>,
        rng: &mut StdRng,
    ) -> Result<MapCoords, SamplerError> {
        let mut energy = Vec::with_capacity(coords.len());
        for &e_true in coords.energy_true {
            let smeared = Normal::new(e_true, self.resolution * e_true)?.sample(rng);
            // The migration kernel tail may cross zero for wide resolutions.
            energy.push(smeared.max(f64::MIN_POSITIVE));
        }
        Ok(MapCoords {
            energy: Some(energy),
            ..Default::default()
        })
    }
}

/// Point-spread function with an energy-independent Gaussian containment
/// radius, in degrees on the sky.
#[derive(Debug, Clone, Copy)]
pub struct GaussianPsf {
    pub sigma: Degrees,
}

/// Declination margin from the poles below which the longitude stretch of
/// the PSF offset is held fixed; right ascension degenerates at the pole.
const POLE_MARGIN: Degrees = 0.1;

impl ResponseMap for GaussianPsf {
    fn sample_coord(
        &self,
        coords: &TrueCoords<'_>,
        rng: &mut StdRng,
    ) -> Result<MapCoords, SamplerError> {
        let mut reco = MapCoords::default();
        let cos_floor = (90.0 - POLE_MARGIN).to_radians().cos();
        for (&ra, &dec) in coords.ra.iter().zip(coords.dec) {
            let offset = Normal::new(0.0, self.sigma)?;
            let d_dec: f64 = offset.sample(rng);
            let d_ra: f64 = offset.sample(rng);
            let dec_reco = (dec + d_dec).clamp(-90.0, 90.0);
            // Longitude offsets grow towards the poles, floored at the margin.
            let stretch = 1.0 / dec_reco.to_radians().cos().max(cos_floor);
            let ra_reco = (ra + d_ra * stretch).rem_euclid(360.0);
            reco.lon.push(ra_reco);
            reco.lat.push(dec_reco);
        }
        Ok(reco)
    }
}
