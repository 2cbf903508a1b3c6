//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

use crate::nlp::{
    context::{DEFAULT_AUTHOR_ROLE, DEFAULT_TARGET_TYPE},
    FeedbackRecord,
};

fn default_author_role() -> Option<String> {
    Some(DEFAULT_AUTHOR_ROLE.to_string())
}

fn default_target_type() -> Option<String> {
    Some(DEFAULT_TARGET_TYPE.to_string())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictItem {
    pub texto: String,
    #[serde(default = "default_author_role")]
    pub author_role: Option<String>,
    #[serde(default = "default_target_type")]
    pub target_type: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

impl From<PredictItem> for FeedbackRecord {
    fn from(item: PredictItem) -> Self {
        FeedbackRecord {
            text: item.texto,
            author_role: item.author_role,
            target_type: item.target_type,
            course_code: item.course_code,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictResponse {
    pub label: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictBatchRequest {
    pub items: Vec<PredictItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictBatchResponseItem {
    pub index: usize,
    pub label: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictBatchResponse {
    pub results: Vec<PredictBatchResponseItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionResponse {
    pub api_version: String,
    pub model_path: String,
    pub schema_version: u32,
    pub capability: String,
    pub labels: Vec<String>,
    pub trained_at: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}
