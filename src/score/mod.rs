//! Overlap scoring of candidate volumes at template locations.

mod overlap;

pub use overlap::{overlap_scores, score};

/// Aggregation applied to the candidate values sampled at the index set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoreMode {
    /// Plain sum: ranks by raw activation overlap.
    Signed,
    /// Sum of absolute values: positive and negative activation rank equally.
    #[default]
    Absolute,
}

/// Both aggregations from a single pass over the index set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlapScores {
    pub signed: f64,
    pub absolute: f64,
}

impl OverlapScores {
    /// Returns the aggregate selected by `mode`.
    pub fn get(&self, mode: ScoreMode) -> f64 {
        match mode {
            ScoreMode::Signed => self.signed,
            ScoreMode::Absolute => self.absolute,
        }
    }
}
