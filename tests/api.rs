mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use insightclass::{
    api::{
        router,
        types::{ErrorBody, HealthResponse, PredictBatchResponse, PredictResponse, VersionResponse},
        AppState,
    },
    nlp::ClassifierKind,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

fn app(kind: ClassifierKind) -> Router {
    app_allowing(kind, &["http://localhost:5173"])
}

fn app_allowing(kind: ClassifierKind, origins: &[&str]) -> Router {
    let state = AppState {
        service: common::trained_service(kind),
        model_path: "models/sentiment.joblib".into(),
    };
    let origins: Vec<String> = origins.iter().map(|o| o.to_string()).collect();
    router(state, &origins)
}

async fn preflight(app: Router, origin: &str) -> Option<HeaderValue> {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .cloned()
}

async fn call<T: DeserializeOwned>(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, T) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let (status, body): (_, HealthResponse) =
        call(app(ClassifierKind::Logistic), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ok");
    assert!(body.model_loaded);
}

#[tokio::test]
async fn version_describes_the_artifact() {
    let (status, body): (_, VersionResponse) =
        call(app(ClassifierKind::LinearSvm), Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.api_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(body.model_path, "models/sentiment.joblib");
    assert_eq!(body.capability, "unscored");
    assert_eq!(body.labels.len(), 3);
}

#[tokio::test]
async fn predict_applies_request_defaults() {
    let (status, body): (_, PredictResponse) = call(
        app(ClassifierKind::Logistic),
        Method::POST,
        "/predict",
        Some(json!({ "texto": "A aula foi excelente e o material clara" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.label, "positivo");
    assert!(body.confidence.is_some());
}

#[tokio::test]
async fn batch_results_are_indexed_in_input_order() {
    let (status, body): (_, PredictBatchResponse) = call(
        app(ClassifierKind::LinearSvm),
        Method::POST,
        "/predict_batch",
        Some(json!({
            "items": [
                { "texto": "A aula foi péssima e o material ruim", "author_role": "aluno" },
                { "texto": "A aula foi maravilhosa", "target_type": "curso", "course_code": "MAT-101" },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let indexes: Vec<usize> = body.results.iter().map(|r| r.index).collect();
    assert_eq!(indexes, vec![0, 1]);
    assert_eq!(body.results[0].label, "negativo");
    assert_eq!(body.results[1].label, "positivo");
    assert!(body.results.iter().all(|r| r.confidence.is_none()));
}

#[tokio::test]
async fn short_text_is_a_bad_request() {
    let (status, body): (_, ErrorBody) = call(
        app(ClassifierKind::Logistic),
        Method::POST,
        "/predict_batch",
        Some(json!({ "items": [{ "texto": "Aula boa" }, { "texto": " " }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.detail.contains("item 1"), "{}", body.detail);
}

#[tokio::test]
async fn cors_preflight_honours_the_origin_list() {
    let app = app_allowing(
        ClassifierKind::Logistic,
        &["http://localhost:5173", "http://127.0.0.1:5173"],
    );
    let allowed = preflight(app.clone(), "http://127.0.0.1:5173").await;
    assert_eq!(allowed.unwrap(), "http://127.0.0.1:5173");
    assert!(preflight(app, "http://evil.example").await.is_none());
}

#[tokio::test]
async fn wildcard_origin_mirrors_any_caller() {
    let app = app_allowing(ClassifierKind::Logistic, &["*"]);
    let allowed = preflight(app, "http://dashboard.example").await;
    assert_eq!(allowed.unwrap(), "http://dashboard.example");
}
