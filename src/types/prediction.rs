//! Prediction outcome data structures

use serde::{Deserialize, Serialize};

/// Binary decision emitted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationLabel {
    NotCanceled,
    Canceled,
}

impl CancellationLabel {
    /// Map the classifier's class index (0 or 1) to a label
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(CancellationLabel::NotCanceled),
            1 => Some(CancellationLabel::Canceled),
            _ => None,
        }
    }

    pub fn class(self) -> u8 {
        match self {
            CancellationLabel::NotCanceled => 0,
            CancellationLabel::Canceled => 1,
        }
    }
}

/// Output of the predictor for one booking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The model's own decision; not derived from `probability`
    pub label: CancellationLabel,

    /// Probability mass of the canceled class (0.0 - 1.0)
    pub probability: f64,
}
