//! Fitted Feature Scalers

use crate::Row;
use feature_schema::FEATURE_DIMENSION;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Deterministic normalization fitted ahead of time
pub trait Scaler: Debug + Send + Sync {
    /// Normalize a row using the fitted parameters
    fn transform(&self, row: &Row) -> Row;

    /// Artifact kind, as written in the interchange document
    fn kind(&self) -> &'static str;
}

/// Zero entries in a fitted scale come from constant features and divide by one
fn handle_zero_scale(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

fn check_params(name: &str, values: &[f64]) -> Result<(), String> {
    if values.len() != FEATURE_DIMENSION {
        return Err(format!(
            "{name} has {} entries, expected {FEATURE_DIMENSION}",
            values.len()
        ));
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(format!("{name}[{idx}] is not finite"));
    }
    Ok(())
}

/// Z-score scaling: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Validate fitted parameters
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        check_params("mean", &mean)?;
        check_params("scale", &scale)?;
        Ok(Self { mean, scale })
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, row: &Row) -> Row {
        let mut out = [0.0; FEATURE_DIMENSION];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = (row[i] - self.mean[i]) / handle_zero_scale(self.scale[i]);
        }
        out
    }

    fn kind(&self) -> &'static str {
        "standard_scaler"
    }
}

/// Min-max scaling onto `feature_range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_range: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl MinMaxScaler {
    /// Validate fitted parameters
    pub fn new(
        data_min: Vec<f64>,
        data_range: Vec<f64>,
        feature_range: (f64, f64),
    ) -> Result<Self, String> {
        check_params("data_min", &data_min)?;
        check_params("data_range", &data_range)?;
        let (lo, hi) = feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(format!("feature_range ({lo}, {hi}) is not a valid interval"));
        }
        Ok(Self {
            data_min,
            data_range,
            feature_range,
        })
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, row: &Row) -> Row {
        let (lo, hi) = self.feature_range;
        let mut out = [0.0; FEATURE_DIMENSION];
        for (i, slot) in out.iter_mut().enumerate() {
            let scale = (hi - lo) / handle_zero_scale(self.data_range[i]);
            *slot = row[i] * scale + (lo - self.data_min[i] * scale);
        }
        out
    }

    fn kind(&self) -> &'static str {
        "min_max_scaler"
    }
}
