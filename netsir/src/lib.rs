//! Stochastic SIR epidemics on contact networks, and a Metropolis-Hastings
//! search over degree-preserving rewirings that favours networks which keep
//! more people susceptible.

pub mod acceptance;
pub mod engine;
pub mod epidemic;
pub mod error;
pub mod generator;
pub mod graph;
pub mod operations;
pub mod risk;
pub mod stats;

pub use acceptance::{AcceptanceRule, Decision, MetropolisAcceptance};
pub use engine::{NetworkSearch, SearchConfig, SearchReport, VisitedGraph};
pub use epidemic::{simulate, simulate_with, HealthState, SirParams, Trajectory};
pub use error::{NetworkError, Result};
pub use graph::ContactGraph;
pub use operations::{double_edge_swap, DoubleEdgeSwap};
pub use risk::{age_risk, AgeRiskAdjustment, NoAdjustment, TransmissionModifier};
