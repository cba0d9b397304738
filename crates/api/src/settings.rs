//! Service Settings
//!
//! Layered as built-in defaults, then an optional TOML file, then
//! `DIALYSIS__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use risk_pipeline::{ThresholdGuidance, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub addr: String,
}

/// Artifact file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSettings {
    pub classifier_path: PathBuf,
    pub scaler_path: PathBuf,
}

/// Decision threshold and the range clients may request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSettings {
    pub threshold: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub artifacts: ArtifactSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let guidance = ThresholdGuidance::default();
        Self {
            server: ServerSettings {
                addr: "0.0.0.0:8080".to_string(),
            },
            artifacts: ArtifactSettings {
                classifier_path: PathBuf::from("model/best_model.json"),
                scaler_path: PathBuf::from("model/scaler.json"),
            },
            scoring: ScoringSettings {
                threshold: DEFAULT_THRESHOLD,
                min_threshold: guidance.min,
                max_threshold: guidance.max,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl Settings {
    /// Load layered settings; `path` is optional and may not exist
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("DIALYSIS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), SettingsError> {
        let scoring = &self.scoring;
        if !scoring.threshold.is_finite() {
            return Err(SettingsError::Invalid {
                key: "scoring.threshold",
                reason: "must be a finite number".to_string(),
            });
        }
        if !(scoring.min_threshold < scoring.max_threshold) {
            return Err(SettingsError::Invalid {
                key: "scoring.min_threshold",
                reason: format!(
                    "{} is not below max_threshold {}",
                    scoring.min_threshold, scoring.max_threshold
                ),
            });
        }
        if !(scoring.min_threshold..=scoring.max_threshold).contains(&scoring.threshold) {
            return Err(SettingsError::Invalid {
                key: "scoring.threshold",
                reason: format!(
                    "{} lies outside [{}, {}]",
                    scoring.threshold, scoring.min_threshold, scoring.max_threshold
                ),
            });
        }
        for (key, path) in [
            ("artifacts.classifier_path", &self.artifacts.classifier_path),
            ("artifacts.scaler_path", &self.artifacts.scaler_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(SettingsError::Invalid {
                    key,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level, SettingsError> {
        self.logging
            .level
            .parse::<Level>()
            .map_err(|e| SettingsError::Invalid {
                key: "logging.level",
                reason: e.to_string(),
            })
    }

    /// Guidance advertised to clients, bounded by the configured range
    pub fn guidance(&self) -> ThresholdGuidance {
        let mut guidance = ThresholdGuidance::default();
        guidance.default = self.scoring.threshold;
        guidance.min = self.scoring.min_threshold;
        guidance.max = self.scoring.max_threshold;
        guidance
            .anchors
            .retain(|a| (self.scoring.min_threshold..=self.scoring.max_threshold).contains(&a.value));
        guidance
    }
}
