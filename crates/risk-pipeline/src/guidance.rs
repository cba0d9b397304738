//! Threshold Guidance
//!
//! Advisory metadata for applications that let a clinician adjust the cut-off.
//! None of this constrains [`crate::decide`].

use serde::Serialize;

/// Reference cut-off
pub const DEFAULT_THRESHOLD: f64 = 0.35;

/// Notable cut-off with advice text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdAnchor {
    pub value: f64,
    pub advice: &'static str,
}

/// Adjustable range and anchors for a threshold control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdGuidance {
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub anchors: Vec<ThresholdAnchor>,
}

impl Default for ThresholdGuidance {
    fn default() -> Self {
        Self {
            default: DEFAULT_THRESHOLD,
            min: 0.10,
            max: 0.75,
            anchors: vec![
                ThresholdAnchor {
                    value: 0.15,
                    advice: "Maximize sensitivity",
                },
                ThresholdAnchor {
                    value: 0.35,
                    advice: "Balanced default",
                },
                ThresholdAnchor {
                    value: 0.50,
                    advice: "May miss some high-risk cases",
                },
                ThresholdAnchor {
                    value: 0.65,
                    advice: "Conservative pre-screen only",
                },
            ],
        }
    }
}

impl ThresholdGuidance {
    /// Whether `threshold` lies in the adjustable range
    pub fn in_range(&self, threshold: f64) -> bool {
        (self.min..=self.max).contains(&threshold)
    }

    /// Advice of the nearest anchor at or below `threshold`
    pub fn advice_for(&self, threshold: f64) -> Option<&'static str> {
        self.anchors
            .iter()
            .rev()
            .find(|a| a.value <= threshold)
            .map(|a| a.advice)
    }
}
