//! Simulation configuration, deserialised from a JSON file.

use anyhow::{Context, bail};
use event_sampler::{
    MapDataset, SkyModel,
    coords::{SkyFrame, SkyPos},
    dataset::{NpredEvaluator, PrecomputedEvaluator},
    gti::Gti,
    map::{BinnedCountsMap, CountsMap, EnergyAxisKind},
    observation::Observation,
    response::{GaussianEdisp, GaussianPsf, ResponseMap},
};
use gammasim_common::Mjd;
use ndarray::Array3;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct SimulationConfig {
    pub(crate) seed: u64,
    gti: GtiConfig,
    observation: ObservationConfig,
    #[serde(default)]
    psf: Option<PsfConfig>,
    #[serde(default)]
    energy_dispersion: Option<EdispConfig>,
    #[serde(default)]
    background: Option<CountsMapConfig>,
    #[serde(default)]
    sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct GtiConfig {
    time_start: Mjd,
    time_stop: Mjd,
    time_ref: Mjd,
    #[serde(default = "default_scale")]
    scale: String,
}

fn default_scale() -> String {
    "TT".to_owned()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ObservationConfig {
    obs_id: u32,
    pointing: SkyPos,
    livetime: f64,
    aeff_meta: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PsfConfig {
    sigma: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct EdispConfig {
    resolution: f64,
}

/// A counts cube as nested edges plus row-major flattened values,
/// `energy x lat x lon`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CountsMapConfig {
    energy_edges: Vec<f64>,
    lat_edges: Vec<f64>,
    lon_edges: Vec<f64>,
    #[serde(default)]
    frame: SkyFrame,
    counts: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SourceConfig {
    name: String,
    position: SkyPos,
    map: CountsMapConfig,
}

impl CountsMapConfig {
    fn build(&self, axis: EnergyAxisKind) -> anyhow::Result<BinnedCountsMap> {
        let shape = (
            self.energy_edges.len().saturating_sub(1),
            self.lat_edges.len().saturating_sub(1),
            self.lon_edges.len().saturating_sub(1),
        );
        let expected = shape.0 * shape.1 * shape.2;
        if self.counts.len() != expected {
            bail!(
                "counts cube has {} values but the axes imply {expected}",
                self.counts.len()
            );
        }
        let data = Array3::from_shape_vec(shape, self.counts.clone())
            .context("counts cube shape mismatch")?;
        Ok(BinnedCountsMap::new(
            data,
            self.energy_edges.clone(),
            self.lat_edges.clone(),
            self.lon_edges.clone(),
            self.frame,
            axis,
        )?)
    }
}

impl SimulationConfig {
    pub(crate) fn build(&self) -> anyhow::Result<(MapDataset, Observation)> {
        let gti = Gti::new(
            self.gti.time_start,
            self.gti.time_stop,
            self.gti.time_ref,
            self.gti.scale.clone(),
        )?;

        let mut models = Vec::new();
        let mut evaluators: BTreeMap<String, Box<dyn NpredEvaluator>> = BTreeMap::new();

        let background = match &self.background {
            Some(config) => {
                models.push(SkyModel::background("background"));
                let map = config
                    .build(EnergyAxisKind::Reconstructed)
                    .context("background map")?;
                Some(Box::new(map) as Box<dyn CountsMap>)
            }
            None => None,
        };

        for source in &self.sources {
            models.push(SkyModel::source(&source.name, source.position));
            let npred = source
                .map
                .build(EnergyAxisKind::True)
                .with_context(|| format!("source '{}' map", source.name))?;
            evaluators.insert(
                source.name.clone(),
                Box::new(PrecomputedEvaluator::new(npred)),
            );
        }

        let dataset = MapDataset {
            models,
            evaluators,
            background,
            psf: self
                .psf
                .as_ref()
                .map(|config| Box::new(GaussianPsf { sigma: config.sigma }) as Box<dyn ResponseMap>),
            edisp: self.energy_dispersion.as_ref().map(|config| {
                Box::new(GaussianEdisp {
                    resolution: config.resolution,
                }) as Box<dyn ResponseMap>
            }),
            gti,
        };
        dataset.validate()?;

        let observation = Observation {
            obs_id: self.observation.obs_id,
            tstart: self.gti.time_start,
            tstop: self.gti.time_stop,
            pointing: self.observation.pointing,
            livetime: self.observation.livetime,
            aeff_meta: self.observation.aeff_meta.clone(),
        };
        Ok((dataset, observation))
    }
}
