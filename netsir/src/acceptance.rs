//! Metropolis-Hastings acceptance driven by simulated outbreaks.
//!
//! The double-edge swap is its own inverse, so the proposal is symmetric and
//! the acceptance ratio reduces to the ratio of target weights. The target
//! weight of a graph is the mean number of individuals still susceptible at the
//! end of the simulated horizon: graphs that contain the outbreak are favoured.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;

use crate::epidemic::{simulate, SirParams};
use crate::error::{NetworkError, Result};
use crate::graph::ContactGraph;

pub const DEFAULT_TRIALS: usize = 100;

/// Outcome of one acceptance step. `graph` is always one of the two inputs.
#[derive(Debug, Clone, Copy)]
pub struct Decision<'a> {
    pub graph: &'a ContactGraph,
    pub accepted: bool,
    pub alpha: f64,
}

/// Chooses between a proposed graph and the current one.
pub trait AcceptanceRule {
    fn decide<'a, R: Rng + ?Sized>(
        &self,
        candidate: &'a ContactGraph,
        current: &'a ContactGraph,
        ages: &[u32],
        rng: &mut R,
    ) -> Result<Decision<'a>>;
}

#[derive(Debug, Clone, Copy)]
pub struct MetropolisAcceptance {
    pub params: SirParams,
    pub trials: usize,
}

impl Default for MetropolisAcceptance {
    fn default() -> Self {
        MetropolisAcceptance {
            params: SirParams::default(),
            trials: DEFAULT_TRIALS,
        }
    }
}

impl MetropolisAcceptance {
    pub fn new(params: SirParams, trials: usize) -> Self {
        MetropolisAcceptance { params, trials }
    }
}

impl AcceptanceRule for MetropolisAcceptance {
    fn decide<'a, R: Rng + ?Sized>(
        &self,
        candidate: &'a ContactGraph,
        current: &'a ContactGraph,
        ages: &[u32],
        rng: &mut R,
    ) -> Result<Decision<'a>> {
        let mean_candidate =
            mean_final_susceptible(candidate, ages, &self.params, self.trials, rng)?;
        let mean_current = mean_final_susceptible(current, ages, &self.params, self.trials, rng)?;
        let alpha = acceptance_ratio(mean_candidate, mean_current)?;

        let u: f64 = rng.gen();
        let accepted = u <= alpha;
        tracing::debug!(mean_candidate, mean_current, alpha, accepted, "metropolis step");

        Ok(Decision {
            graph: if accepted { candidate } else { current },
            accepted,
            alpha,
        })
    }
}

/// `min(candidate / current, 1)`.
pub fn acceptance_ratio(mean_candidate: f64, mean_current: f64) -> Result<f64> {
    if mean_current <= 0.0 {
        return Err(NetworkError::DegenerateAcceptance);
    }
    Ok((mean_candidate / mean_current).min(1.0))
}

/// Average susceptible count on the last day over `trials` independent runs.
///
/// One seed per trial is drawn from `rng` up front; each trial then runs on
/// its own `Pcg64` in parallel, so the result only depends on `rng`'s state
/// and not on how rayon schedules the trials.
pub fn mean_final_susceptible<R: Rng + ?Sized>(
    graph: &ContactGraph,
    ages: &[u32],
    params: &SirParams,
    trials: usize,
    rng: &mut R,
) -> Result<f64> {
    if trials == 0 {
        return Err(NetworkError::InvalidParameter(
            "trials must be at least 1".to_string(),
        ));
    }
    let seeds: Vec<u64> = (0..trials).map(|_| rng.gen()).collect();
    let total = seeds
        .par_iter()
        .map(|&seed| {
            let mut trial_rng = Pcg64::seed_from_u64(seed);
            simulate(graph, ages, params, None, &mut trial_rng).map(|t| t.final_susceptible())
        })
        .try_reduce(|| 0usize, |a, b| Ok(a + b))?;

    Ok(total as f64 / trials as f64)
}
