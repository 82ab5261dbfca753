//! Presentation of a prediction: percentage and verdict

use crate::types::prediction::{CancellationLabel, Prediction};
use serde::Serialize;

/// Visual treatment of the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStyle {
    Error,
    Success,
}

impl VerdictStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            VerdictStyle::Error => "verdict verdict-error",
            VerdictStyle::Success => "verdict verdict-success",
        }
    }
}

/// Human readable verdict for a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// "Canceled" or "Not Canceled"
    pub short: &'static str,
    /// Sentence shown in the results area
    pub message: &'static str,
    pub style: VerdictStyle,
}

pub fn verdict(label: CancellationLabel) -> Verdict {
    match label {
        CancellationLabel::Canceled => Verdict {
            short: "Canceled",
            message: "The booking is likely to be canceled.",
            style: VerdictStyle::Error,
        },
        CancellationLabel::NotCanceled => Verdict {
            short: "Not Canceled",
            message: "The booking is likely not canceled.",
            style: VerdictStyle::Success,
        },
    }
}

/// Format a probability as a percentage with two decimals (0.3742 -> "37.42%")
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// A prediction ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedResult {
    pub probability: String,
    pub verdict: Verdict,
}

impl From<&Prediction> for RenderedResult {
    fn from(prediction: &Prediction) -> Self {
        Self {
            probability: format_probability(prediction.probability),
            verdict: verdict(prediction.label),
        }
    }
}
