//! Age-dependent adjustment of the per-contact infection probability.
//!
//! The propagation engine does not use age unless a caller hands it a
//! [`TransmissionModifier`] other than [`NoAdjustment`].

/// Additive adjustment to the infection probability for an individual of `age`.
///
/// Brackets: 0-5 → +0.10, 6-12 → +0.05, 13-64 → -0.05, 65+ → +0.05, each
/// scaled by `p_transmit * p_recover`.
pub fn age_risk(age: u32, p_transmit: f64, p_recover: f64) -> f64 {
    let weight = match age {
        0..=5 => 0.10,
        6..=12 => 0.05,
        13..=64 => -0.05,
        _ => 0.05,
    };
    weight * p_transmit * p_recover
}

/// Per-individual hook applied to `p_transmit * p_contact` before the
/// infection draws. Implementations must return a value in `[0, 1]`.
pub trait TransmissionModifier: Sync {
    fn adjust(&self, age: u32, p_infect: f64) -> f64;
}

/// Leaves the infection probability untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAdjustment;

impl TransmissionModifier for NoAdjustment {
    fn adjust(&self, _age: u32, p_infect: f64) -> f64 {
        p_infect
    }
}

/// Adds [`age_risk`] to the infection probability, clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct AgeRiskAdjustment {
    pub p_transmit: f64,
    pub p_recover: f64,
}

impl TransmissionModifier for AgeRiskAdjustment {
    fn adjust(&self, age: u32, p_infect: f64) -> f64 {
        (p_infect + age_risk(age, self.p_transmit, self.p_recover)).clamp(0.0, 1.0)
    }
}
