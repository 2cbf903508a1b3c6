//! Runtime configuration utilities for insightclass.

use std::{env, path::PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "models/sentiment.joblib";
pub const DEFAULT_TRAINING_CSV: &str = "data/rotulados_ensino_medio.csv";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Model artifact written by `train` and loaded by `serve` / `predict`.
    pub model_path: PathBuf,
    /// Labelled CSV used by `train` when `--csv` is not given.
    pub training_csv: PathBuf,
    /// Origins allowed to call the HTTP API from a browser.
    pub cors_origins: Vec<String>,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let model_path = env::var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH));
        let training_csv = env::var("TRAINING_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TRAINING_CSV));
        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        Ok(Self {
            model_path,
            training_csv,
            cors_origins,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            training_csv: PathBuf::from(DEFAULT_TRAINING_CSV),
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

/// Split a comma separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
