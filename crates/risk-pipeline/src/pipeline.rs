//! Scoring Pipeline

use crate::decision::{decide, ScoreResult};
use crate::ScoringError;
use feature_schema::{FeatureRow, FeatureSchema, FeatureVector, FEATURES};
use risk_model::{ArtifactError, ArtifactStore, ScoringArtifacts};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Positive-class probability for one feature mapping.
///
/// Fails with [`ScoringError::Schema`] before touching the artifacts when the
/// mapping's names differ from the schema.
pub fn score(vector: &FeatureVector, artifacts: &ScoringArtifacts) -> Result<f64, ScoringError> {
    let row = FeatureSchema::order(vector)?;
    score_row(&row, artifacts)
}

fn score_row(row: &FeatureRow, artifacts: &ScoringArtifacts) -> Result<f64, ScoringError> {
    let scaled = artifacts.scaler().transform(row.values());
    if let Some(idx) = scaled.iter().position(|v| !v.is_finite()) {
        return Err(ScoringError::NonFinite {
            stage: "scaling",
            feature: FEATURES[idx].name.to_string(),
        });
    }

    let [_, positive] = artifacts.classifier().predict_probability(&scaled);
    if !(0.0..=1.0).contains(&positive) {
        return Err(ScoringError::InvalidProbability(positive));
    }

    Ok(positive)
}

/// Decision plus the canonical row it was computed from
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub result: ScoreResult,
    pub row: FeatureRow,
}

/// Scores feature mappings with artifacts from an injected store
pub struct ScoringPipeline {
    store: Arc<ArtifactStore>,
    classifier_path: PathBuf,
    scaler_path: PathBuf,
}

impl ScoringPipeline {
    pub fn new(
        store: Arc<ArtifactStore>,
        classifier_path: impl Into<PathBuf>,
        scaler_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            classifier_path: classifier_path.into(),
            scaler_path: scaler_path.into(),
        }
    }

    /// Load artifacts eagerly so a broken deployment fails at startup
    pub fn warm_up(&self) -> Result<Arc<ScoringArtifacts>, ArtifactError> {
        let artifacts = self.artifacts()?;
        info!(
            "Scoring pipeline ready: {} -> {}",
            artifacts.scaler().kind(),
            artifacts.classifier().kind()
        );
        Ok(artifacts)
    }

    pub fn artifacts(&self) -> Result<Arc<ScoringArtifacts>, ArtifactError> {
        self.store.load(&self.classifier_path, &self.scaler_path)
    }

    /// Cached artifacts without triggering a load
    pub fn loaded_artifacts(&self) -> Option<Arc<ScoringArtifacts>> {
        self.store.get()
    }

    pub fn classifier_path(&self) -> &Path {
        &self.classifier_path
    }

    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    /// Positive-class probability for `vector`
    pub fn score(&self, vector: &FeatureVector) -> Result<f64, ScoringError> {
        let row = FeatureSchema::order(vector)?;
        let artifacts = self.artifacts()?;
        score_row(&row, &artifacts)
    }

    /// Score `vector` and label it against `threshold`
    pub fn assess(&self, vector: &FeatureVector, threshold: f64) -> Result<Assessment, ScoringError> {
        let row = FeatureSchema::order(vector)?;
        let artifacts = self.artifacts()?;
        let probability = score_row(&row, &artifacts)?;
        let result = decide(probability, threshold);

        debug!(
            "Assessment: p={:.4}, threshold={:.2}, label={}",
            probability,
            threshold,
            result.label().as_str()
        );

        Ok(Assessment { result, row })
    }
}
