//! Feature Schema Routes

use axum::Json;
use feature_schema::{FeatureSchema, FeatureSpec};
use serde::Serialize;

/// Response for schema endpoint
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub features: &'static [FeatureSpec],
    pub count: usize,
}

/// Get the ordered feature list with units
pub async fn get_schema() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        features: FeatureSchema::features(),
        count: FeatureSchema::len(),
    })
}
