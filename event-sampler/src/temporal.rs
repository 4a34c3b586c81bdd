//! Temporal models for arrival-time sampling.

use gammasim_common::Mjd;
use rand::{Rng, rngs::StdRng};

/// Capability to draw `n` arrival times over an observation span.
pub trait TemporalModel {
    /// Draws `n` timestamps in `[start, stop)`, both MJD.
    fn sample_time(&self, n: usize, start: Mjd, stop: Mjd, rng: &mut StdRng) -> Vec<Mjd>;
}

/// Constant event rate: arrival times uniform over the span.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantTemporalModel;

impl TemporalModel for ConstantTemporalModel {
    fn sample_time(&self, n: usize, start: Mjd, stop: Mjd, rng: &mut StdRng) -> Vec<Mjd> {
        if stop <= start {
            return vec![start; n];
        }
        (0..n).map(|_| rng.random_range(start..stop)).collect()
    }
}
