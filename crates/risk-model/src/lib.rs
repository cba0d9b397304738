//! Risk Model Artifacts
//!
//! Loads the fitted feature scaler and risk classifier from their JSON
//! interchange documents and keeps them cached for the process lifetime.

mod classifier;
mod document;
mod scaler;
mod store;
mod tree;

pub use classifier::{Classifier, EnsembleKind, LogisticRegression, TreeEnsemble, TreeEnsembleParams};
pub use document::{ArtifactDocument, FORMAT_VERSION};
pub use scaler::{MinMaxScaler, Scaler, StandardScaler};
pub use store::{ArtifactLoader, ArtifactStore, JsonArtifactLoader, ScoringArtifacts};
pub use tree::{DecisionTree, TreeParams};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Feature row in training order
pub type Row = [f64; feature_schema::FEATURE_DIMENSION];

/// Errors while obtaining scoring artifacts
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    /// File missing, unreadable, or not a valid artifact document
    #[error("Artifact load failed for {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
    /// Document parsed but does not provide the required capability
    #[error("Artifact contract violated by {}: {reason}", .path.display())]
    Contract { path: PathBuf, reason: String },
}

impl ArtifactError {
    pub(crate) fn load(path: &Path, reason: impl Into<String>) -> Self {
        ArtifactError::Load {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn contract(path: &Path, reason: impl Into<String>) -> Self {
        ArtifactError::Contract {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
