use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{NetworkError, Result};
use crate::graph::ContactGraph;

pub const DEFAULT_SWAP_ATTEMPTS: usize = 10_000;

/// Degree-preserving rewiring used as the proposal step of the search.
#[derive(Clone, Copy, Debug)]
pub struct DoubleEdgeSwap {
    pub max_attempts: usize,
}

impl Default for DoubleEdgeSwap {
    fn default() -> Self {
        DoubleEdgeSwap {
            max_attempts: DEFAULT_SWAP_ATTEMPTS,
        }
    }
}

impl DoubleEdgeSwap {
    pub fn new(max_attempts: usize) -> Self {
        DoubleEdgeSwap { max_attempts }
    }

    pub fn propose<R: Rng + ?Sized>(&self, graph: &ContactGraph, rng: &mut R) -> Result<ContactGraph> {
        double_edge_swap(graph, self.max_attempts, rng)
    }
}

/// Returns a copy of `graph` with edges (p,q) and (r,s) rewired to (p,s) and (r,q).
///
/// All four endpoints must be distinct and neither new edge may already exist,
/// so every row sum is preserved and exactly four unordered cells change.
pub fn double_edge_swap<R: Rng + ?Sized>(
    graph: &ContactGraph,
    max_attempts: usize,
    rng: &mut R,
) -> Result<ContactGraph> {
    let n = graph.num_nodes();
    if graph.is_complete() {
        return Err(NetworkError::DegenerateGraph(
            "graph is fully connected".to_string(),
        ));
    }
    if n < 4 {
        return Err(NetworkError::DegenerateGraph(format!(
            "a swap needs four distinct individuals, graph has {n}"
        )));
    }
    let edges = graph.edge_list();
    if edges.len() < 2 {
        return Err(NetworkError::DegenerateGraph(format!(
            "a swap needs two edges, graph has {}",
            edges.len()
        )));
    }

    for _ in 0..max_attempts {
        let (i1, j1) = oriented(&edges, rng);
        let (i2, j2) = oriented(&edges, rng);

        if i1 == i2 || i1 == j1 || i1 == j2 || j1 == i2 || j1 == j2 || i2 == j2 {
            continue;
        }
        if graph.has_edge(i1, j2) || graph.has_edge(i2, j1) {
            continue;
        }

        let mut swapped = graph.clone();
        swapped.remove_edge(i1, j1);
        swapped.remove_edge(i2, j2);
        swapped.set(i1, j2, 1);
        swapped.set(i2, j1, 1);
        tracing::trace!(i1, j1, i2, j2, "double edge swap");
        return Ok(swapped);
    }

    Err(NetworkError::NoValidSwapFound {
        attempts: max_attempts,
    })
}

// Picks an edge uniformly and flips a coin for its direction.
fn oriented<R: Rng + ?Sized>(edges: &[(usize, usize)], rng: &mut R) -> (usize, usize) {
    let &(u, v) = edges.choose(rng).unwrap_or(&(0, 0));
    if rng.gen_bool(0.5) {
        (u, v)
    } else {
        (v, u)
    }
}
