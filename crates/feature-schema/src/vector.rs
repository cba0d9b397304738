//! Feature Vector and Canonical Row

use crate::schema::{FeatureSpec, FEATURES, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named feature values supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: HashMap<String, f64>,
}

impl FeatureVector {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vector holding every schema feature at 0.0
    pub fn zeroed() -> Self {
        FEATURES.iter().map(|f| (f.name.to_string(), 0.0)).collect()
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    /// Fill every schema feature the caller left unset with 0.0
    pub fn fill_missing(&mut self) {
        for feature in FEATURES.iter() {
            self.values.entry(feature.name.to_string()).or_insert(0.0);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

/// Feature values in training order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow([f64; FEATURE_DIMENSION]);

impl FeatureRow {
    pub fn new(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.0
    }

    /// Pair each value with its feature definition
    pub fn iter_named(&self) -> impl Iterator<Item = (&'static FeatureSpec, f64)> + '_ {
        FEATURES.iter().zip(self.0.iter().copied())
    }
}

impl Default for FeatureRow {
    fn default() -> Self {
        Self([0.0; FEATURE_DIMENSION])
    }
}
