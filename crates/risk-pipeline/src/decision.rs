//! Threshold Decision Policy

use serde::{Deserialize, Serialize};

/// Categorical outcome of a scoring request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    /// Probability at or above the threshold
    HighRisk,
    /// Probability below the threshold
    LowRisk,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::HighRisk => "HIGH_RISK",
            RiskLabel::LowRisk => "LOW_RISK",
        }
    }

    /// Schedule recommendation shown alongside the label
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLabel::HighRisk => "High risk: increasing dialysis frequency is advised",
            RiskLabel::LowRisk => "Low risk: maintain the current dialysis frequency",
        }
    }
}

/// Probability, label, and the cut-off that produced the label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    probability: f64,
    label: RiskLabel,
    threshold_used: f64,
}

impl ScoreResult {
    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn label(&self) -> RiskLabel {
        self.label
    }

    pub fn threshold_used(&self) -> f64 {
        self.threshold_used
    }

    pub fn is_high_risk(&self) -> bool {
        self.label == RiskLabel::HighRisk
    }
}

/// Label `probability` against `threshold`.
///
/// The boundary is inclusive on the high side: `probability == threshold` is
/// high risk. Any real threshold is accepted.
pub fn decide(probability: f64, threshold: f64) -> ScoreResult {
    let label = if probability >= threshold {
        RiskLabel::HighRisk
    } else {
        RiskLabel::LowRisk
    };

    ScoreResult {
        probability,
        label,
        threshold_used: threshold,
    }
}
