use crate::error::{NetworkError, Result};

/// Symmetric contact matrix over a fixed population.
///
/// Cells hold edge multiplicities. Anything positive counts as a contact during
/// propagation; the exact value only matters for degree bookkeeping. Self-loops
/// on the diagonal and multi-edges come out of the configuration model and are
/// kept as they are.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContactGraph {
    num_nodes: usize,
    // Row-major, num_nodes * num_nodes.
    cells: Vec<u32>,
}

impl ContactGraph {
    pub fn new(num_nodes: usize) -> Self {
        ContactGraph {
            num_nodes,
            cells: vec![0; num_nodes * num_nodes],
        }
    }

    /// Builds a graph from a square, symmetric matrix.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self> {
        let n = rows.len();
        let mut graph = ContactGraph::new(n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(NetworkError::DimensionMismatch {
                    what: "adjacency row",
                    expected: n,
                    found: row.len(),
                });
            }
            graph.cells[i * n..(i + 1) * n].copy_from_slice(row);
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if graph.get(i, j) != graph.get(j, i) {
                    return Err(NetworkError::InvalidParameter(format!(
                        "adjacency matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }
        Ok(graph)
    }

    /// Builds a graph from an undirected edge list. Repeated pairs stack.
    pub fn from_edges(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut graph = ContactGraph::new(num_nodes);
        for &(u, v) in edges {
            if u >= num_nodes || v >= num_nodes {
                return Err(NetworkError::InvalidParameter(format!(
                    "edge ({u}, {v}) out of range for {num_nodes} nodes"
                )));
            }
            graph.add_edge(u, v);
        }
        Ok(graph)
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn get(&self, u: usize, v: usize) -> u32 {
        self.cells[u * self.num_nodes + v]
    }

    /// Writes `value` to both `(u, v)` and `(v, u)`.
    pub(crate) fn set(&mut self, u: usize, v: usize, value: u32) {
        let n = self.num_nodes;
        self.cells[u * n + v] = value;
        self.cells[v * n + u] = value;
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.get(u, v) > 0
    }

    /// Adds one edge. A self-loop puts two on the diagonal so that row sums
    /// stay equal to degrees.
    pub fn add_edge(&mut self, u: usize, v: usize) {
        let value = self.get(u, v).saturating_add(loop_weight(u, v));
        self.set(u, v, value);
    }

    /// Drops one edge from `(u, v)`. Returns false if there was none.
    pub fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        let current = self.get(u, v);
        if current == 0 {
            return false;
        }
        self.set(u, v, current.saturating_sub(loop_weight(u, v)));
        true
    }

    /// Row sum, counting multiplicity.
    pub fn degree(&self, u: usize) -> usize {
        let n = self.num_nodes;
        self.cells[u * n..(u + 1) * n]
            .iter()
            .map(|&c| c as usize)
            .sum()
    }

    pub fn degree_sequence(&self) -> Vec<usize> {
        (0..self.num_nodes).map(|u| self.degree(u)).collect()
    }

    /// Distinct contacts of `u`, excluding `u` itself.
    pub fn neighbors(&self, u: usize) -> Vec<usize> {
        (0..self.num_nodes)
            .filter(|&v| v != u && self.has_edge(u, v))
            .collect()
    }

    /// Connected pairs `(u, v)` with `u < v`, each listed once.
    pub fn edge_list(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for u in 0..self.num_nodes {
            for v in (u + 1)..self.num_nodes {
                if self.has_edge(u, v) {
                    edges.push((u, v));
                }
            }
        }
        edges
    }

    pub fn num_edges(&self) -> usize {
        self.edge_list().len()
    }

    /// True when every pair of distinct individuals is in contact.
    pub fn is_complete(&self) -> bool {
        (0..self.num_nodes).all(|u| ((u + 1)..self.num_nodes).all(|v| self.has_edge(u, v)))
    }

    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells
            .chunks(self.num_nodes.max(1))
            .take(self.num_nodes)
            .map(|row| row.to_vec())
            .collect()
    }
}

fn loop_weight(u: usize, v: usize) -> u32 {
    if u == v {
        2
    } else {
        1
    }
}
