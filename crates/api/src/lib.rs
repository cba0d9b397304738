//! Incremental Dialysis Risk API Server
//!
//! HTTP surface over the scoring pipeline for intake forms and audit tools.

use axum::{extract::State, response::IntoResponse, routing::{get, post}, Json, Router};
use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use risk_model::ArtifactStore;
use risk_pipeline::{ScoringPipeline, ThresholdGuidance};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
pub mod settings;

pub use error::ApiError;
pub use settings::{Settings, SettingsError};

/// Application state shared across handlers
pub struct AppState {
    /// Scoring pipeline over the shared artifact store
    pub pipeline: ScoringPipeline,
    /// Threshold range and advice offered to clients
    pub guidance: ThresholdGuidance,
    /// Prometheus renderer, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state from settings
    pub fn new(settings: &Settings, metrics: Option<PrometheusHandle>) -> Self {
        let pipeline = ScoringPipeline::new(
            Arc::new(ArtifactStore::new()),
            settings.artifacts.classifier_path.clone(),
            settings.artifacts.scaler_path.clone(),
        );
        Self {
            pipeline,
            guidance: settings.guidance(),
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: Option<ModelInfo>,
}

/// Loaded artifact kinds
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub scaler: String,
    pub classifier: String,
    pub feature_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/schema", get(routes::schema::get_schema))
        .route("/api/v1/thresholds", get(routes::thresholds::get_thresholds))
        .route("/api/v1/score", post(routes::score::post_score))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model = state.pipeline.loaded_artifacts().map(|artifacts| ModelInfo {
        scaler: artifacts.scaler().kind().to_string(),
        classifier: artifacts.classifier().kind().to_string(),
        feature_count: feature_schema::FEATURE_DIMENSION,
    });

    Json(HealthResponse {
        status: if model.is_some() { "healthy" } else { "unavailable" }.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model,
    })
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Initialize logging
pub fn init_logging(settings: &Settings) -> anyhow::Result<()> {
    let level = settings.log_level()?;
    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);

    let result = if settings.logging.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set tracing subscriber")
}

/// Run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let state = Arc::new(AppState::new(&settings, Some(metrics)));

    // refuse to serve without artifacts
    state.pipeline.warm_up().with_context(|| {
        format!(
            "Cannot load scoring artifacts (classifier={}, scaler={})",
            settings.artifacts.classifier_path.display(),
            settings.artifacts.scaler_path.display()
        )
    })?;

    let app = create_router(state);

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
