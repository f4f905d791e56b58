use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    config::Config,
    handler::{handle_request, InvocationEvent, InvocationResponse},
    secrets::SecretStore,
    weather::WeatherService,
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: Arc<WeatherService>,
    pub secrets: Arc<dyn SecretStore>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

impl IntoResponse for InvocationResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

// Route handlers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Trigger-style invocation: the event names the path, the envelope comes back as JSON.
pub async fn invoke(
    State(state): State<AppState>,
    Json(event): Json<InvocationEvent>,
) -> Json<InvocationResponse> {
    Json(handle_request(&state, &event.raw_path).await)
}

/// Plain HTTP: the request path is routed and the envelope becomes the HTTP response.
pub async fn by_path(State(state): State<AppState>, uri: Uri) -> InvocationResponse {
    handle_request(&state, uri.path()).await
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/invoke", post(invoke))
        .fallback(get(by_path))
        .with_state(state)
}
