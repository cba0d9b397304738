//! JSON Interchange Documents
//!
//! Each artifact file is a JSON object tagged by `kind` and stamped with
//! `format_version`. Scaler kinds provide `transform`; classifier kinds provide
//! `predict_probability`.

use crate::classifier::{Classifier, EnsembleKind, LogisticRegression, TreeEnsemble, TreeEnsembleParams};
use crate::scaler::{MinMaxScaler, Scaler, StandardScaler};
use serde::{Deserialize, Serialize};

/// Interchange format revision this build reads
pub const FORMAT_VERSION: u64 = 1;

/// Parsed artifact document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactDocument {
    StandardScaler(StandardScaler),
    MinMaxScaler(MinMaxScaler),
    ExtraTrees(TreeEnsembleParams),
    RandomForest(TreeEnsembleParams),
    LogisticRegression(LogisticRegression),
}

impl ArtifactDocument {
    /// Parse a document, checking the format version first
    pub fn from_json(text: &str) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;

        match value.get("format_version").and_then(serde_json::Value::as_u64) {
            Some(FORMAT_VERSION) => {}
            Some(other) => {
                return Err(format!(
                    "unsupported format_version {other}, expected {FORMAT_VERSION}"
                ))
            }
            None => return Err("missing format_version".to_string()),
        }

        serde_json::from_value(value).map_err(|e| format!("invalid artifact document: {e}"))
    }

    /// Kind tag as written in the document
    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactDocument::StandardScaler(_) => "standard_scaler",
            ArtifactDocument::MinMaxScaler(_) => "min_max_scaler",
            ArtifactDocument::ExtraTrees(_) => "extra_trees",
            ArtifactDocument::RandomForest(_) => "random_forest",
            ArtifactDocument::LogisticRegression(_) => "logistic_regression",
        }
    }

    /// Build a scaler, failing if this document does not provide `transform`
    pub fn into_scaler(self) -> Result<Box<dyn Scaler>, String> {
        match self {
            ArtifactDocument::StandardScaler(s) => Ok(Box::new(StandardScaler::new(s.mean, s.scale)?)),
            ArtifactDocument::MinMaxScaler(s) => Ok(Box::new(MinMaxScaler::new(
                s.data_min,
                s.data_range,
                s.feature_range,
            )?)),
            other => Err(format!("{} does not provide transform", other.kind())),
        }
    }

    /// Build a classifier, failing if this document does not provide `predict_probability`
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, String> {
        match self {
            ArtifactDocument::ExtraTrees(p) => {
                Ok(Box::new(TreeEnsemble::from_params(EnsembleKind::ExtraTrees, &p)?))
            }
            ArtifactDocument::RandomForest(p) => {
                Ok(Box::new(TreeEnsemble::from_params(EnsembleKind::RandomForest, &p)?))
            }
            ArtifactDocument::LogisticRegression(m) => {
                Ok(Box::new(LogisticRegression::new(m.coefficients, m.intercept)?))
            }
            other => Err(format!("{} does not provide predict_probability", other.kind())),
        }
    }
}
