//! HTTP route handlers for Axum.

use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::{
    api::types::{
        ErrorBody, HealthResponse, PredictBatchRequest, PredictBatchResponse,
        PredictBatchResponseItem, PredictItem, PredictResponse, VersionResponse,
    },
    error::Error,
    nlp::FeedbackRecord,
    service::PredictionResult,
};

use super::AppState;

type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

fn map_error(err: Error) -> ApiError {
    if err.is_client_error() {
        api_error(StatusCode::BAD_REQUEST, format!("prediction failed: {err}"))
    } else {
        warn!(%err, "prediction failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// Run CPU-bound prediction off the async executor.
async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?
        .map_err(map_error)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: true,
    })
}

pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    let artifact = state.service.artifact();
    Json(VersionResponse {
        api_version: env!("CARGO_PKG_VERSION").to_string(),
        model_path: state.model_path.display().to_string(),
        schema_version: artifact.schema_version(),
        capability: artifact.capability().to_string(),
        labels: artifact.labels().to_vec(),
        trained_at: artifact.created_at().to_rfc3339(),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    Json(item): Json<PredictItem>,
) -> ApiResult<PredictResponse> {
    let record = FeedbackRecord::from(item);
    let service = state.service.clone();
    let PredictionResult { label, confidence } =
        run_blocking(move || service.predict_one(&record)).await?;
    Ok(Json(PredictResponse { label, confidence }))
}

pub async fn predict_batch(
    State(state): State<AppState>,
    Json(payload): Json<PredictBatchRequest>,
) -> ApiResult<PredictBatchResponse> {
    let records: Vec<FeedbackRecord> = payload.items.into_iter().map(Into::into).collect();
    let service = state.service.clone();
    let predictions = run_blocking(move || service.predict_batch(&records)).await?;
    let results = predictions
        .into_iter()
        .enumerate()
        .map(|(index, result)| PredictBatchResponseItem {
            index,
            label: result.label,
            confidence: result.confidence,
        })
        .collect();
    Ok(Json(PredictBatchResponse { results }))
}
