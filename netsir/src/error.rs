//! Error types for simulation, mutation and search.

use thiserror::Error;

/// Errors raised by the propagation engine, the swap operator, the acceptance
/// rule and the search loop.
///
/// None of these are recoverable inside the operation that raised them. The
/// search loop stops at the first one and hands it back unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    /// Two inputs that must describe the same population disagree in size.
    #[error("dimension mismatch: {what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Probability outside `[0, 1]`, zero iteration count, malformed matrix, etc.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The graph admits no double-edge swap at all.
    #[error("degenerate graph: {0}")]
    DegenerateGraph(String),

    /// The swap sampler used up its attempt budget.
    #[error("no valid swap found after {attempts} attempts")]
    NoValidSwapFound { attempts: usize },

    /// Every trial on the current graph ended with zero susceptibles.
    #[error("degenerate acceptance: mean susceptible count of the current graph is zero")]
    DegenerateAcceptance,
}

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Checks that `value` is a finite probability.
pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NetworkError::InvalidParameter(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}
