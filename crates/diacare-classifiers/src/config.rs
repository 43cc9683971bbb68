use serde::{Deserialize, Serialize};

/// Offset added to the in-sample accuracy before it is shown to a user.
///
/// This is a presentation constant carried over from the reference screens.
/// It has no statistical derivation and is never applied inside the predictor.
pub const DEFAULT_DISPLAY_CALIBRATION_OFFSET: f64 = 0.18;

/// Split quality measure.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Entropy,
    Gini,
}

/// Decision tree hyper-parameters.
///
/// The defaults are the fixed production values: entropy splitting, depth 4,
/// at least 2 samples to split a node, at least 1 sample per leaf, seed 42.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub criterion: Criterion,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Seeds the per-node feature permutation that breaks ties between equally good splits.
    pub random_state: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            criterion: Criterion::Entropy,
            max_depth: 4,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: 42,
        }
    }
}

/// Converts a raw in-sample accuracy into the figure shown on screen and in reports.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DisplayCalibration {
    pub offset: f64,
}

impl DisplayCalibration {
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }

    /// Shift `raw_score` by the offset, clamped to `[0, 1]`.
    pub fn apply(&self, raw_score: f64) -> f64 {
        (raw_score + self.offset).clamp(0.0, 1.0)
    }

    /// Displayed accuracy as a percentage rounded to two decimals.
    pub fn percent(&self, raw_score: f64) -> f64 {
        (self.apply(raw_score) * 100.0 * 100.0).round() / 100.0
    }
}

impl Default for DisplayCalibration {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_CALIBRATION_OFFSET)
    }
}
