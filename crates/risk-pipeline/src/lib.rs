//! Incremental Dialysis Risk Pipeline
//!
//! Orders a caller's 28 measurements into training order, applies the fitted
//! scaler and classifier, and labels the positive-class probability against a
//! threshold.

mod decision;
mod guidance;
mod pipeline;

pub use decision::{decide, RiskLabel, ScoreResult};
pub use guidance::{ThresholdAnchor, ThresholdGuidance, DEFAULT_THRESHOLD};
pub use pipeline::{score, Assessment, ScoringPipeline};

use feature_schema::SchemaMismatchError;
use risk_model::ArtifactError;
use thiserror::Error;

/// Errors while scoring a single request
#[derive(Debug, Clone, Error)]
pub enum ScoringError {
    /// Feature mapping does not match the schema
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
    /// Artifacts could not be obtained
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// A scaled feature value became non-finite
    #[error("Non-finite value at {stage} for {feature}")]
    NonFinite { stage: &'static str, feature: String },
    /// Classifier produced a positive-class probability outside [0, 1]
    #[error("Classifier returned invalid probability {0}")]
    InvalidProbability(f64),
}

impl ScoringError {
    /// Whether the error is confined to the offending request
    pub fn is_per_request(&self) -> bool {
        !matches!(self, ScoringError::Artifact(_))
    }
}
