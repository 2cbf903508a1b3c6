//! HTTP layer exposing the prediction service.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{config::Settings, service::PredictionService};

#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
    pub model_path: PathBuf,
}

/// Build the router; exposed separately from [`serve`] for in-process tests.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/version", get(routes::version))
        .route("/predict", post(routes::predict))
        .route("/predict_batch", post(routes::predict_batch))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Load the model, then accept requests. A load failure aborts before binding.
pub async fn serve(settings: Settings, host: String, port: u16) -> Result<()> {
    let service = PredictionService::load(&settings.model_path).with_context(|| {
        format!(
            "could not load model at {}",
            settings.model_path.display()
        )
    })?;
    let state = AppState {
        service,
        model_path: settings.model_path.clone(),
    };
    let app = router(state, &settings.cors_origins);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving insightclass API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
