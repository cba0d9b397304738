//! Incremental Dialysis Risk Service - Main Entry Point

use api::{init_logging, run_server, Settings};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dialysis-risk.toml"));

    let settings = Settings::load(Some(&config_path))?;
    init_logging(&settings)?;

    info!("=== Incremental Dialysis Risk Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Threshold {:.2} (adjustable {:.2}..={:.2})",
        settings.scoring.threshold, settings.scoring.min_threshold, settings.scoring.max_threshold
    );

    run_server(settings).await
}
