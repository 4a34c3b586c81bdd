use crate::caldb::CbdParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("dataset declares no model components")]
    NoModels,
    #[error("dataset declares neither a background model nor any source model")]
    NothingToSample,
    #[error("no evaluator registered for model '{0}'")]
    MissingEvaluator(String),
    #[error("background model '{0}' declared without a background rate map")]
    MissingBackgroundMap(String),
    #[error("background rate map supplied without a background model component")]
    OrphanBackgroundMap,
    #[error("event table has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("coordinate payload carries no energy axis")]
    MissingEnergyAxis,
    #[error("response map returned no '{0}' payload")]
    MissingResponsePayload(&'static str),
    #[error("response map returned {got} samples for {expected} events")]
    ResponseLengthMismatch { expected: usize, got: usize },
    #[error("invalid Poisson rate: {0}")]
    Poisson(#[from] rand_distr::PoissonError),
    #[error("invalid normal distribution: {0}")]
    Normal(#[from] rand_distr::NormalError),
    #[error("invalid bin weights: {0}")]
    Weights(#[from] rand::distr::weighted::Error),
    #[error("counts map: {0}")]
    Map(#[from] MapError),
    #[error("good time interval: {0}")]
    Gti(#[from] GtiError),
    #[error("calibration string: {0}")]
    Cbd(#[from] CbdParseError),
    #[error("missing calibration header '{0}'")]
    MissingCalibrationKey(String),
    #[error("calendar conversion: {0}")]
    MjdConversion(#[from] gammasim_common::time::MjdConversionError),
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("axis '{axis}' has {edges} edges for {bins} bins")]
    EdgeCount {
        axis: &'static str,
        edges: usize,
        bins: usize,
    },
    #[error("axis '{0}' edges are not strictly increasing")]
    NonMonotonicEdges(&'static str),
    #[error("counts cube contains a negative or non-finite value")]
    InvalidCounts,
}

#[derive(Debug, Error)]
pub enum GtiError {
    #[error("time_stop {stop} precedes time_start {start}")]
    InvertedInterval { start: f64, stop: f64 },
    #[error("time bound is not finite")]
    NonFiniteBound,
}
