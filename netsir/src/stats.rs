use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};

use crate::graph::ContactGraph;

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Normalised histogram of degrees over `num_bins` bins.
/// The range is `0..max(max_degree, num_bins)`, so it adapts per graph.
pub fn degree_distribution(graph: &ContactGraph, num_bins: usize) -> Vec<f64> {
    if graph.num_nodes() == 0 || num_bins == 0 {
        return vec![0.0; num_bins];
    }
    let degrees = graph.degree_sequence();
    let local_max_degree = degrees.iter().copied().max().unwrap_or(0);
    let range_max = std::cmp::max(local_max_degree, num_bins);

    let mut hist = vec![0.0; num_bins];
    for &deg in &degrees {
        let bin_idx = std::cmp::min(deg * num_bins / range_max, num_bins - 1);
        hist[bin_idx] += 1.0;
    }
    normalize(&mut hist);
    hist
}

/// Local clustering coefficient of every individual, on distinct neighbours.
pub fn clustering_coefficients(graph: &ContactGraph) -> Vec<f64> {
    (0..graph.num_nodes())
        .map(|u| {
            let neighbors = graph.neighbors(u);
            let k = neighbors.len();
            if k < 2 {
                return 0.0;
            }
            let mut links = 0;
            for i in 0..k {
                for j in (i + 1)..k {
                    if graph.has_edge(neighbors[i], neighbors[j]) {
                        links += 1;
                    }
                }
            }
            (2.0 * links as f64) / (k * (k - 1)) as f64
        })
        .collect()
}

/// Normalised histogram of clustering coefficients over `[0, 1]`.
pub fn clustering_distribution(graph: &ContactGraph, num_bins: usize) -> Vec<f64> {
    let mut hist = vec![0.0; num_bins];
    if graph.num_nodes() < 3 || num_bins == 0 {
        return hist;
    }
    for c in clustering_coefficients(graph) {
        let bin_idx = std::cmp::min((c * num_bins as f64) as usize, num_bins - 1);
        hist[bin_idx] += 1.0;
    }
    normalize(&mut hist);
    hist
}

/// Eigenvalues of the simple-graph Laplacian `L = D - A`, ascending.
/// Loops and multiplicities are ignored.
pub fn laplacian_spectrum(graph: &ContactGraph) -> Vec<f64> {
    let n = graph.num_nodes();
    if n == 0 {
        return Vec::new();
    }
    let mut laplacian = DMatrix::<f64>::zeros(n, n);
    for u in 0..n {
        let neighbors = graph.neighbors(u);
        laplacian[(u, u)] = neighbors.len() as f64;
        for v in neighbors {
            laplacian[(u, v)] = -1.0;
        }
    }
    let eig = SymmetricEigen::new(laplacian);
    let mut eigenvalues: Vec<f64> = eig.eigenvalues.iter().copied().collect();
    eigenvalues.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    eigenvalues
}

/// Shape of a contact network, attached to each graph a search returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySummary {
    pub num_edges: usize,
    pub mean_degree: f64,
    pub max_degree: usize,
    pub mean_clustering: f64,
    /// Second-smallest Laplacian eigenvalue; zero iff the graph is disconnected.
    pub algebraic_connectivity: f64,
    pub degree_histogram: Vec<f64>,
    pub clustering_histogram: Vec<f64>,
}

impl TopologySummary {
    pub fn of(graph: &ContactGraph) -> Self {
        Self::with_bins(graph, DEFAULT_HISTOGRAM_BINS)
    }

    pub fn with_bins(graph: &ContactGraph, num_bins: usize) -> Self {
        let n = graph.num_nodes();
        let degrees = graph.degree_sequence();
        let clustering = clustering_coefficients(graph);
        let spectrum = laplacian_spectrum(graph);
        let mean = |values: &[f64]| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };
        TopologySummary {
            num_edges: graph.num_edges(),
            mean_degree: if n == 0 {
                0.0
            } else {
                degrees.iter().sum::<usize>() as f64 / n as f64
            },
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            mean_clustering: mean(&clustering),
            algebraic_connectivity: spectrum.get(1).copied().unwrap_or(0.0).max(0.0),
            degree_histogram: degree_distribution(graph, num_bins),
            clustering_histogram: clustering_distribution(graph, num_bins),
        }
    }
}

fn normalize(hist: &mut [f64]) {
    let sum: f64 = hist.iter().sum();
    if sum > 0.0 {
        for x in hist.iter_mut() {
            *x /= sum;
        }
    }
}
