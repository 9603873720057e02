//! Common types for intent classification.

use serde::{Deserialize, Serialize};

/// A label picked by a classifier together with its output activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class label.
    pub label: String,
    /// Activation of the winning output neuron, in `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    pub fn new<S: Into<String>>(label: S, confidence: f64) -> Self {
        Prediction {
            label: label.into(),
            confidence,
        }
    }

    /// Whether the confidence is a usable number.
    pub fn is_valid(&self) -> bool {
        self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)
    }
}

/// One analysed training phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Stems of the phrase, in token order.
    pub stems: Vec<String>,
    /// Intent tag the phrase belongs to.
    pub label: String,
}
