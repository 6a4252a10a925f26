use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::acceptance::AcceptanceRule;
use crate::error::{NetworkError, Result};
use crate::generator::configuration_model;
use crate::graph::ContactGraph;
use crate::operations::{DoubleEdgeSwap, DEFAULT_SWAP_ATTEMPTS};
use crate::stats::TopologySummary;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Share of distinct visited graphs to return, in `(0, 1]`.
    pub keep_fraction: f64,
    pub outer_iters: usize,
    pub max_swap_attempts: usize,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            keep_fraction: 0.1,
            outer_iters: 10,
            max_swap_attempts: DEFAULT_SWAP_ATTEMPTS,
            seed: 0,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.keep_fraction.is_finite() && self.keep_fraction > 0.0 && self.keep_fraction <= 1.0)
        {
            return Err(NetworkError::InvalidParameter(format!(
                "keep_fraction must lie in (0, 1], got {}",
                self.keep_fraction
            )));
        }
        if self.outer_iters == 0 {
            return Err(NetworkError::InvalidParameter(
                "outer_iters must be at least 1".to_string(),
            ));
        }
        if self.max_swap_attempts == 0 {
            return Err(NetworkError::InvalidParameter(
                "max_swap_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A distinct graph the chain settled on, with how often it did.
#[derive(Debug, Clone)]
pub struct VisitedGraph {
    pub graph: ContactGraph,
    pub visits: usize,
    pub summary: TopologySummary,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Most visited first; ties keep first-visit order.
    pub graphs: Vec<VisitedGraph>,
    pub distinct_graphs: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Visit counts keyed on exact cell contents.
#[derive(Debug, Default)]
struct Ledger {
    index: HashMap<ContactGraph, usize>,
    // (graph, visits) in first-visit order.
    entries: Vec<(ContactGraph, usize)>,
}

impl Ledger {
    fn record(&mut self, graph: &ContactGraph) {
        match self.index.get(graph) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(graph.clone(), self.entries.len());
                self.entries.push((graph.clone(), 1));
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn into_ranked(self) -> Vec<(ContactGraph, usize)> {
        let mut entries = self.entries;
        // Stable sort keeps first-visit order among equal counts.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// Metropolis-Hastings walk over the graphs sharing one degree sequence.
pub struct NetworkSearch {
    config: SearchConfig,
}

impl NetworkSearch {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(NetworkSearch { config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Generates a starting graph for `degree_sequence` and walks from it.
    pub fn search<A: AcceptanceRule>(
        &self,
        degree_sequence: &[usize],
        ages: &[u32],
        rule: &A,
    ) -> Result<SearchReport> {
        if ages.len() != degree_sequence.len() {
            return Err(NetworkError::DimensionMismatch {
                what: "ages",
                expected: degree_sequence.len(),
                found: ages.len(),
            });
        }
        let mut rng = Pcg64::seed_from_u64(self.config.seed);
        let initial = configuration_model(degree_sequence, &mut rng)?;
        self.search_from(initial, ages, rule, &mut rng)
    }

    /// Walks from `initial`, drawing every proposal and decision from `rng`.
    pub fn search_from<A: AcceptanceRule, R: Rng + ?Sized>(
        &self,
        initial: ContactGraph,
        ages: &[u32],
        rule: &A,
        rng: &mut R,
    ) -> Result<SearchReport> {
        let proposal = DoubleEdgeSwap::new(self.config.max_swap_attempts);
        let mut current = initial;
        let mut ledger = Ledger::default();
        let (mut accepted, mut rejected) = (0, 0);

        tracing::info!(
            nodes = current.num_nodes(),
            edges = current.num_edges(),
            iterations = self.config.outer_iters,
            "starting network search"
        );

        for iteration in 0..self.config.outer_iters {
            let candidate = proposal.propose(&current, rng)?;
            let decision = rule.decide(&candidate, &current, ages, rng)?;
            tracing::debug!(
                iteration,
                alpha = decision.alpha,
                accepted = decision.accepted,
                "search step"
            );
            if decision.accepted {
                accepted += 1;
                current = candidate;
            } else {
                rejected += 1;
            }
            ledger.record(&current);
        }

        let distinct_graphs = ledger.len();
        let keep = std::cmp::max(
            1,
            (self.config.keep_fraction * distinct_graphs as f64).floor() as usize,
        );
        let graphs: Vec<VisitedGraph> = ledger
            .into_ranked()
            .into_iter()
            .take(keep)
            .map(|(graph, visits)| VisitedGraph {
                summary: TopologySummary::of(&graph),
                graph,
                visits,
            })
            .collect();

        tracing::info!(
            distinct_graphs,
            returned = graphs.len(),
            accepted,
            rejected,
            "network search finished"
        );

        Ok(SearchReport {
            graphs,
            distinct_graphs,
            accepted,
            rejected,
        })
    }
}
