//! Invocation entry point: every request, whichever way it arrives, ends up in
//! [`handle_request`] and leaves as an [`InvocationResponse`].

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::routes::AppState;
use crate::weather::ServiceError;

const NOT_FOUND: &str = "Not Found";
const INTERNAL_ERROR: &str = "Something went wrong";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    pub raw_path: String,
}

/// `{statusCode, body}` where `body` is itself a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn json<T: Serialize>(status_code: u16, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code,
            body: serde_json::to_string_pretty(body)?,
        })
    }

    /// A body holding a single JSON string, e.g. `"Not Found"`.
    pub fn message(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: serde_json::Value::String(message.to_string()).to_string(),
        }
    }
}

pub async fn handle_request(state: &AppState, raw_path: &str) -> InvocationResponse {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("invocation", %request_id, raw_path);

    async move {
        match dispatch(state, raw_path).await {
            Ok(response) => response,
            Err(ServiceError::Upstream { status, message }) => {
                InvocationResponse::message(status, &message)
            }
            Err(e) => {
                tracing::error!(error = ?e, "Request failed: {}", e);
                InvocationResponse::message(500, INTERNAL_ERROR)
            }
        }
    }
    .instrument(span)
    .await
}

async fn dispatch(state: &AppState, raw_path: &str) -> Result<InvocationResponse, ServiceError> {
    // Fetched per invocation so a rotated key is picked up immediately.
    let api_key = state
        .secrets
        .get_parameter(&state.config.api_key_parameter)
        .await?;

    if raw_path == state.config.weather_route {
        let snapshot = state.weather.current_weather(&api_key).await?;
        Ok(InvocationResponse::json(200, &snapshot)?)
    } else {
        Ok(InvocationResponse::message(404, NOT_FOUND))
    }
}
