use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{NetworkError, Result};
use crate::graph::ContactGraph;

/// Random pseudograph realising `degrees` by stub matching.
///
/// Each individual contributes one stub per unit of degree; the shuffled stubs
/// are paired off in order. Pairs landing on the same individual add a
/// self-loop and repeated pairs stack into multi-edges. Both are left in
/// place, and the row sums of the result equal `degrees`.
pub fn configuration_model<R: Rng + ?Sized>(degrees: &[usize], rng: &mut R) -> Result<ContactGraph> {
    let total: usize = degrees.iter().sum();
    if total % 2 != 0 {
        return Err(NetworkError::InvalidParameter(format!(
            "degree sequence must have an even sum, got {total}"
        )));
    }

    let mut stubs: Vec<usize> = degrees
        .iter()
        .enumerate()
        .flat_map(|(node, &d)| std::iter::repeat(node).take(d))
        .collect();
    stubs.shuffle(rng);

    let mut graph = ContactGraph::new(degrees.len());
    for pair in stubs.chunks_exact(2) {
        graph.add_edge(pair[0], pair[1]);
    }
    tracing::debug!(
        nodes = degrees.len(),
        stubs = total,
        "generated configuration-model graph"
    );
    Ok(graph)
}
