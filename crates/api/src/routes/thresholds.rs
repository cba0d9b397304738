//! Threshold Guidance Routes

use axum::{extract::State, Json};
use risk_pipeline::ThresholdGuidance;
use std::sync::Arc;

use crate::AppState;

/// Get the default threshold, allowed range, and advice anchors
pub async fn get_thresholds(State(state): State<Arc<AppState>>) -> Json<ThresholdGuidance> {
    Json(state.guidance.clone())
}
