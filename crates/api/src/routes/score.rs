//! Scoring Routes

use axum::{extract::State, Json};
use feature_schema::FeatureVector;
use metrics::{counter, histogram};
use risk_pipeline::{RiskLabel, ScoringError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::{ApiError, AppState};

/// Body of a scoring request
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    /// Feature name to value
    pub features: FeatureVector,
    /// Cut-off override; the configured default applies when absent
    pub threshold: Option<f64>,
    /// Default unset features to 0.0 instead of rejecting the request
    #[serde(default)]
    pub fill_missing: bool,
    /// Include the canonical input row in the response
    #[serde(default)]
    pub echo: bool,
}

/// Canonical input value for audit display
#[derive(Debug, Serialize)]
pub struct EchoEntry {
    pub name: &'static str,
    pub unit: &'static str,
    pub value: f64,
}

/// Response for scoring endpoint
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub probability: f64,
    pub label: RiskLabel,
    pub threshold_used: f64,
    pub recommendation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<EchoEntry>>,
}

/// Score one patient's measurements
pub async fn post_score(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let start = Instant::now();
    counter!("scoring_requests_total").increment(1);

    let threshold = request.threshold.unwrap_or(state.guidance.default);
    if !state.guidance.in_range(threshold) {
        counter!("scoring_failures_total", "reason" => "threshold").increment(1);
        return Err(ApiError::BadRequest(format!(
            "threshold {threshold} outside [{}, {}]",
            state.guidance.min, state.guidance.max
        )));
    }

    let mut features = request.features;
    if request.fill_missing {
        features.fill_missing();
    }

    let assessment = state.pipeline.assess(&features, threshold).map_err(|e| {
        let reason = match &e {
            ScoringError::Schema(_) => "schema",
            ScoringError::Artifact(_) => "artifact",
            ScoringError::NonFinite { .. } => "non_finite",
            ScoringError::InvalidProbability(_) => "invalid_probability",
        };
        counter!("scoring_failures_total", "reason" => reason).increment(1);
        warn!("Scoring rejected: {}", e);
        e
    })?;

    let result = assessment.result;
    if result.is_high_risk() {
        counter!("scoring_high_risk_total").increment(1);
    }
    histogram!("scoring_latency_ms").record(start.elapsed().as_secs_f64() * 1000.0);
    debug!("Scored request in {:?}", start.elapsed());

    let input = request.echo.then(|| {
        assessment
            .row
            .iter_named()
            .map(|(spec, value)| EchoEntry {
                name: spec.name,
                unit: spec.unit,
                value,
            })
            .collect()
    });

    Ok(Json(ScoreResponse {
        probability: result.probability(),
        label: result.label(),
        threshold_used: result.threshold_used(),
        recommendation: result.label().recommendation(),
        advice: state.guidance.advice_for(threshold),
        input,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_state;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    const FIXTURE_ZERO_PROBABILITY: f64 = 0.7345238095238095;

    fn request(features: FeatureVector) -> ScoreRequest {
        ScoreRequest {
            features,
            threshold: None,
            fill_missing: false,
            echo: false,
        }
    }

    #[tokio::test]
    async fn test_score_zero_row() {
        let Json(response) = post_score(State(fixture_state()), Json(request(FeatureVector::zeroed())))
            .await
            .unwrap();

        assert!((response.probability - FIXTURE_ZERO_PROBABILITY).abs() < 1e-12);
        assert_eq!(response.label, RiskLabel::HighRisk);
        assert_eq!(response.threshold_used, 0.35);
        assert_eq!(response.advice, Some("Balanced default"));
        assert!(response.input.is_none());
    }

    #[tokio::test]
    async fn test_threshold_override_and_echo() {
        let mut body = request(FeatureVector::zeroed());
        body.threshold = Some(0.75);
        body.echo = true;

        let Json(response) = post_score(State(fixture_state()), Json(body)).await.unwrap();
        assert_eq!(response.label, RiskLabel::LowRisk);
        assert_eq!(response.threshold_used, 0.75);

        let input = response.input.unwrap();
        assert_eq!(input.len(), 28);
        assert_eq!(input[0].name, "Dialysis session length");
        assert_eq!(input[0].unit, "hour");
    }

    #[tokio::test]
    async fn test_threshold_outside_range_rejected() {
        let mut body = request(FeatureVector::zeroed());
        body.threshold = Some(0.9);

        let err = post_score(State(fixture_state()), Json(body)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_feature_rejected() {
        let mut features = FeatureVector::zeroed();
        features.remove("PTH");

        let err = post_score(State(fixture_state()), Json(request(features)))
            .await
            .unwrap_err();
        match &err {
            ApiError::Scoring(ScoringError::Schema(mismatch)) => {
                assert_eq!(mismatch.missing, vec!["PTH".to_string()]);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_fill_missing_defaults_to_zero() {
        let mut body = request(FeatureVector::new());
        body.fill_missing = true;

        let Json(response) = post_score(State(fixture_state()), Json(body)).await.unwrap();
        assert!((response.probability - FIXTURE_ZERO_PROBABILITY).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_request_deserializes() {
        let body: ScoreRequest = serde_json::from_str(
            r#"{"features": {"PTH": 320.0, "GFR": 4.2}, "threshold": 0.5, "fill_missing": true}"#,
        )
        .unwrap();
        assert_eq!(body.features.get("PTH"), Some(320.0));
        assert_eq!(body.threshold, Some(0.5));
        assert!(body.fill_missing);
        assert!(!body.echo);
    }
}
