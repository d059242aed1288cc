//! Application configuration.

use std::path::Path;

use basis_hedge::HedgeConfig;
use basis_mm::QuoterConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quoting parameters.
    #[serde(default)]
    pub quoter: QuoterConfig,
    /// Hedging parameters.
    #[serde(default)]
    pub hedge: HedgeConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path resolution: `BASIS_CONFIG` env var, then `config/default.toml`.
    /// A missing file falls back to defaults with a warning.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("BASIS_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
