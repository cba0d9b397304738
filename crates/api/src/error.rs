//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use risk_pipeline::ScoringError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unexpected: Vec<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Scoring(ScoringError::Artifact(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Scoring(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (missing, unexpected) = match &self {
            ApiError::Scoring(ScoringError::Schema(err)) => {
                (err.missing.clone(), err.unexpected.clone())
            }
            _ => (Vec::new(), Vec::new()),
        };

        let body = ErrorBody {
            error: self.to_string(),
            missing,
            unexpected,
        };
        (status, Json(body)).into_response()
    }
}
