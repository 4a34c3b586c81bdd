//! Predicted-counts maps and coordinate sampling.
//!
//! A [`CountsMap`] is the read-only expectation surface the sampler draws
//! from: expected counts over sky-position and energy bins. The concrete
//! [`BinnedCountsMap`] holds an `energy x lat x lon` cube and samples
//! coordinate tuples proportional to the bin-weighted density, with a
//! uniform jitter inside the selected bin.

use crate::{
    coords::SkyFrame,
    error::{MapError, SamplerError},
};
use gammasim_common::{Degrees, TeV};
use ndarray::Array3;
use rand::{Rng, rngs::StdRng};
use rand_distr::{Distribution, weighted::WeightedIndex};
use serde::{Deserialize, Serialize};

/// Coordinate tuples drawn from a map, in the map's native frame.
///
/// The energy payload is slotted by axis kind: maps binned in true energy
/// fill `energy_true`, already-reconstructed maps (background) fill
/// `energy`. Readers prefer the true slot and fall back to the plain one.
#[derive(Debug, Clone, Default)]
pub struct MapCoords {
    pub lon: Vec<Degrees>,
    pub lat: Vec<Degrees>,
    pub frame: SkyFrame,
    pub energy_true: Option<Vec<TeV>>,
    pub energy: Option<Vec<TeV>>,
}

impl MapCoords {
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    /// The tolerant energy read: true energy when present, else plain.
    pub fn preferred_energy(&self) -> Result<&[TeV], SamplerError> {
        self.energy_true
            .as_deref()
            .or(self.energy.as_deref())
            .ok_or(SamplerError::MissingEnergyAxis)
    }
}

/// Which energy axis a map is binned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyAxisKind {
    #[default]
    True,
    Reconstructed,
}

/// A map of expected counts supporting weighted coordinate draws.
pub trait CountsMap {
    /// Total expected counts, the Poisson rate of the whole map.
    fn total(&self) -> f64;

    /// Draws `n` coordinate tuples proportional to bin-weighted density.
    fn sample_coord(&self, n: usize, rng: &mut StdRng) -> Result<MapCoords, SamplerError>;
}

/// Expected counts binned over `energy x lat x lon`.
#[derive(Debug, Clone)]
pub struct BinnedCountsMap {
    data: Array3<f64>,
    energy_edges: Vec<TeV>,
    lat_edges: Vec<Degrees>,
    lon_edges: Vec<Degrees>,
    frame: SkyFrame,
    energy_axis: EnergyAxisKind,
}

fn check_edges(name: &'static str, edges: &[f64], bins: usize) -> Result<(), MapError> {
    if edges.len() != bins + 1 {
        return Err(MapError::EdgeCount {
            axis: name,
            edges: edges.len(),
            bins,
        });
    }
    if edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MapError::NonMonotonicEdges(name));
    }
    Ok(())
}

impl BinnedCountsMap {
    pub fn new(
        data: Array3<f64>,
        energy_edges: Vec<TeV>,
        lat_edges: Vec<Degrees>,
        lon_edges: Vec<Degrees>,
        frame: SkyFrame,
        energy_axis: EnergyAxisKind,
    ) -> Result<Self, MapError> {
        let (n_energy, n_lat, n_lon) = data.dim();
        check_edges("energy", &energy_edges, n_energy)?;
        check_edges("lat", &lat_edges, n_lat)?;
        check_edges("lon", &lon_edges, n_lon)?;
        if data.iter().any(|&v| !v.is_finite() || v < 0.0) {
            return Err(MapError::InvalidCounts);
        }
        Ok(Self {
            data,
            energy_edges,
            lat_edges,
            lon_edges,
            frame,
            energy_axis,
        })
    }

    pub fn frame(&self) -> SkyFrame {
        self.frame
    }

    pub fn energy_axis(&self) -> EnergyAxisKind {
        self.energy_axis
    }

    fn jitter(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
        rng.random_range(lo..hi)
    }
}

impl CountsMap for BinnedCountsMap {
    fn total(&self) -> f64 {
        self.data.sum()
    }

    fn sample_coord(&self, n: usize, rng: &mut StdRng) -> Result<MapCoords, SamplerError> {
        let mut coords = MapCoords {
            frame: self.frame,
            ..Default::default()
        };
        let energies = match self.energy_axis {
            EnergyAxisKind::True => coords.energy_true.insert(Vec::with_capacity(n)),
            EnergyAxisKind::Reconstructed => coords.energy.insert(Vec::with_capacity(n)),
        };
        if n == 0 {
            return Ok(coords);
        }

        let (_, n_lat, n_lon) = self.data.dim();
        let weights = WeightedIndex::new(self.data.iter().copied())?;

        for _ in 0..n {
            let flat = weights.sample(rng);
            let i_energy = flat / (n_lat * n_lon);
            let i_lat = (flat / n_lon) % n_lat;
            let i_lon = flat % n_lon;

            energies.push(Self::jitter(
                rng,
                self.energy_edges[i_energy],
                self.energy_edges[i_energy + 1],
            ));
            coords.lat.push(Self::jitter(
                rng,
                self.lat_edges[i_lat],
                self.lat_edges[i_lat + 1],
            ));
            coords.lon.push(Self::jitter(
                rng,
                self.lon_edges[i_lon],
                self.lon_edges[i_lon + 1],
            ));
        }
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn single_bin_map(counts: f64, axis: EnergyAxisKind) -> BinnedCountsMap {
        BinnedCountsMap::new(
            Array3::from_elem((1, 1, 1), counts),
            vec![1.0, 10.0],
            vec![21.0, 23.0],
            vec![83.0, 84.0],
            SkyFrame::Icrs,
            axis,
        )
        .unwrap()
    }

    #[test]
    fn total_sums_every_bin() {
        let data = Array3::from_shape_vec((2, 1, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let map = BinnedCountsMap::new(
            data,
            vec![1.0, 3.0, 10.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0, 2.0],
            SkyFrame::Icrs,
            EnergyAxisKind::True,
        )
        .unwrap();
        assert_eq!(map.total(), 10.0);
    }

    #[test]
    fn samples_stay_inside_their_bins() {
        let map = single_bin_map(5.0, EnergyAxisKind::True);
        let mut rng = StdRng::seed_from_u64(1);
        let coords = map.sample_coord(100, &mut rng).unwrap();
        assert_eq!(coords.len(), 100);
        let energy = coords.preferred_energy().unwrap();
        assert!(energy.iter().all(|&e| (1.0..10.0).contains(&e)));
        assert!(coords.lat.iter().all(|&b| (21.0..23.0).contains(&b)));
        assert!(coords.lon.iter().all(|&l| (83.0..84.0).contains(&l)));
    }

    #[test]
    fn reconstructed_axis_fills_the_plain_energy_slot() {
        let map = single_bin_map(5.0, EnergyAxisKind::Reconstructed);
        let mut rng = StdRng::seed_from_u64(2);
        let coords = map.sample_coord(10, &mut rng).unwrap();
        assert!(coords.energy_true.is_none());
        assert_eq!(coords.energy.as_ref().unwrap().len(), 10);
    }

    #[test]
    fn draws_follow_bin_weights() {
        // One bin carries 90% of the weight.
        let data = Array3::from_shape_vec((1, 1, 2), vec![9.0, 1.0]).unwrap();
        let map = BinnedCountsMap::new(
            data,
            vec![1.0, 10.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0, 2.0],
            SkyFrame::Icrs,
            EnergyAxisKind::True,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let coords = map.sample_coord(2000, &mut rng).unwrap();
        let heavy = coords.lon.iter().filter(|&&l| l < 1.0).count();
        let fraction = heavy as f64 / 2000.0;
        assert!((0.87..0.93).contains(&fraction), "fraction {fraction}");
    }

    #[test]
    fn mismatched_edges_are_rejected() {
        let result = BinnedCountsMap::new(
            Array3::from_elem((1, 1, 1), 1.0),
            vec![1.0, 10.0, 20.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            SkyFrame::Icrs,
            EnergyAxisKind::True,
        );
        assert!(matches!(result, Err(MapError::EdgeCount { .. })));
    }

    #[test]
    fn negative_counts_are_rejected() {
        let result = BinnedCountsMap::new(
            Array3::from_elem((1, 1, 1), -1.0),
            vec![1.0, 10.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            SkyFrame::Icrs,
            EnergyAxisKind::True,
        );
        assert!(matches!(result, Err(MapError::InvalidCounts)));
    }
}
