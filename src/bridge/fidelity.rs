//! Fidelity scoring
//!
//! `score = 1 - (ws * semantic + wc * completion + wt * structural)` with the
//! weights normalized to sum 1. The three terms are heuristics, not a proven
//! measure of information loss, and the defaults are arbitrary constants:
//!
//! - semantic: extensions of the current input plus canonical predicates
//!   dropped by the target, over the input's source fields (mapped plus
//!   extension)
//! - completion: target-required fields filled from defaults, over all
//!   target-required fields
//! - structural: warnings, saturating at `structural_saturation`

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FidelityConfig {
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,
    #[serde(default = "default_completion_weight")]
    pub completion_weight: f64,
    #[serde(default = "default_structural_weight")]
    pub structural_weight: f64,
    /// Warning count at which the structural term reaches 1
    #[serde(default = "default_structural_saturation")]
    pub structural_saturation: usize,
    /// Scores below this raise `fidelity_below_threshold`
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

fn default_semantic_weight() -> f64 {
    0.5
}

fn default_completion_weight() -> f64 {
    0.3
}

fn default_structural_weight() -> f64 {
    0.2
}

fn default_structural_saturation() -> usize {
    10
}

fn default_min_score() -> f64 {
    0.5
}

impl Default for FidelityConfig {
    fn default() -> Self {
        Self {
            semantic_weight: default_semantic_weight(),
            completion_weight: default_completion_weight(),
            structural_weight: default_structural_weight(),
            structural_saturation: default_structural_saturation(),
            min_score: default_min_score(),
        }
    }
}

/// Counts the score is computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FidelityInputs {
    pub source_fields: usize,
    pub dropped_extensions: usize,
    pub dropped_predicates: usize,
    pub required_fields: usize,
    pub defaulted_fields: usize,
    pub warnings: usize,
}

/// Per-term breakdown of a fidelity score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FidelityReport {
    pub semantic_loss: f64,
    pub completion_loss: f64,
    pub structural_loss: f64,
    /// Normalized semantic, completion and structural weights
    pub weights: [f64; 3],
    pub score: f64,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        (numerator as f64 / denominator as f64).min(1.0)
    }
}

pub fn score(inputs: &FidelityInputs, config: &FidelityConfig) -> FidelityReport {
    let semantic_loss = ratio(
        inputs.dropped_extensions + inputs.dropped_predicates,
        inputs.source_fields,
    );
    let completion_loss = ratio(inputs.defaulted_fields, inputs.required_fields);
    let saturation = config.structural_saturation.max(1);
    let structural_loss = ratio(inputs.warnings.min(saturation), saturation);

    let raw = [
        config.semantic_weight.max(0.0),
        config.completion_weight.max(0.0),
        config.structural_weight.max(0.0),
    ];
    let total: f64 = raw.iter().sum();
    let weights = if total > 0.0 {
        raw.map(|w| w / total)
    } else {
        [0.0; 3]
    };

    let loss = weights[0] * semantic_loss + weights[1] * completion_loss + weights[2] * structural_loss;
    let score = (1.0 - loss).clamp(0.0, 1.0);

    info!(
        semantic_loss,
        completion_loss,
        structural_loss,
        score,
        "Fidelity terms"
    );

    FidelityReport {
        semantic_loss,
        completion_loss,
        structural_loss,
        weights,
        score,
    }
}
