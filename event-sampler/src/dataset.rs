//! The map dataset: model components, evaluators, responses and GTI.

use crate::{
    coords::SkyPos,
    error::SamplerError,
    gti::Gti,
    map::{BinnedCountsMap, CountsMap},
    response::ResponseMap,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which instrument response corrections a predicted-counts computation
/// applies. Passed by value to [`NpredEvaluator::npred`]; source sampling
/// always requests [`IrfCorrections::NONE`] so that smearing is applied
/// once, later, across all sources jointly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrfCorrections {
    pub psf: bool,
    pub edisp: bool,
}

impl IrfCorrections {
    pub const ALL: Self = Self {
        psf: true,
        edisp: true,
    };
    pub const NONE: Self = Self {
        psf: false,
        edisp: false,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Source { position: SkyPos },
    Background,
}

/// One sky model component. Background components are sampled from the
/// dataset's background rate map; source components through their
/// registered evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyModel {
    pub name: String,
    pub kind: ModelKind,
}

impl SkyModel {
    pub fn source(name: impl Into<String>, position: SkyPos) -> Self {
        Self {
            name: name.into(),
            kind: ModelKind::Source { position },
        }
    }

    pub fn background(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModelKind::Background,
        }
    }

    /// The dispatch predicate: background components are skipped by the
    /// source generator and sampled through the background path instead.
    pub fn is_background(&self) -> bool {
        matches!(self.kind, ModelKind::Background)
    }

    pub fn position(&self) -> Option<SkyPos> {
        match self.kind {
            ModelKind::Source { position } => Some(position),
            ModelKind::Background => None,
        }
    }
}

/// Capability to compute a predicted-counts map for one model component.
pub trait NpredEvaluator {
    fn npred(&self, corrections: IrfCorrections) -> Result<Box<dyn CountsMap>, SamplerError>;
}

/// An evaluator holding a precomputed true-space prediction.
///
/// Flux-prediction machinery is an external collaborator; this wrapper
/// carries its uncorrected output, which is exactly what source sampling
/// requests via [`IrfCorrections::NONE`].
pub struct PrecomputedEvaluator {
    npred: BinnedCountsMap,
}

impl PrecomputedEvaluator {
    pub fn new(npred: BinnedCountsMap) -> Self {
        Self { npred }
    }
}

impl NpredEvaluator for PrecomputedEvaluator {
    fn npred(&self, _corrections: IrfCorrections) -> Result<Box<dyn CountsMap>, SamplerError> {
        Ok(Box::new(self.npred.clone()))
    }
}

/// Everything one sampling run consumes: model components in declaration
/// order, per-model evaluators keyed by model name, the evaluated
/// background rate map, optional responses, and the good time interval.
pub struct MapDataset {
    pub models: Vec<SkyModel>,
    pub evaluators: BTreeMap<String, Box<dyn NpredEvaluator>>,
    pub background: Option<Box<dyn CountsMap>>,
    pub psf: Option<Box<dyn ResponseMap>>,
    pub edisp: Option<Box<dyn ResponseMap>>,
    pub gti: Gti,
}

impl MapDataset {
    /// Source components with their declaration index.
    pub fn source_models(&self) -> impl Iterator<Item = (usize, &SkyModel)> {
        self.models
            .iter()
            .enumerate()
            .filter(|(_, model)| !model.is_background())
    }

    pub fn background_model(&self) -> Option<&SkyModel> {
        self.models.iter().find(|model| model.is_background())
    }

    pub fn evaluator(&self, name: &str) -> Result<&dyn NpredEvaluator, SamplerError> {
        self.evaluators
            .get(name)
            .map(Box::as_ref)
            .ok_or_else(|| SamplerError::MissingEvaluator(name.to_owned()))
    }

    /// Rejects ill-formed configurations up front, so sampling never hits
    /// an unbound result path at merge time.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.models.is_empty() {
            return Err(SamplerError::NoModels);
        }
        for (_, model) in self.source_models() {
            self.evaluator(&model.name)?;
        }
        match (self.background_model(), self.background.is_some()) {
            (Some(model), false) => {
                return Err(SamplerError::MissingBackgroundMap(model.name.clone()));
            }
            (None, true) => return Err(SamplerError::OrphanBackgroundMap),
            _ => {}
        }
        Ok(())
    }
}
