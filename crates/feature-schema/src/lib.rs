//! Clinical Feature Schema
//!
//! Defines the 28 baseline measurements a dialysis patient is scored on, in the
//! exact order the scaler and classifier were fitted with.

mod error;
mod schema;
mod vector;

pub use error::SchemaMismatchError;
pub use schema::{FeatureGroup, FeatureSchema, FeatureSpec, FEATURES, FEATURE_DIMENSION};
pub use vector::{FeatureRow, FeatureVector};
