//! Controller for webhook events pushed to the watchdog.
//!
//! Every request is answered with HTTP 200. Whether the event was accepted is reported
//! in the `status` field of the body so that senders never retry on our behalf.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{AppState, Result};

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use domain::IngestOutcome;
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

/// Acknowledgment returned for every webhook request.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    /// Either `success` or `error`
    pub status: String,
    pub message: String,
}

impl WebhookResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

impl From<&IngestOutcome> for WebhookResponse {
    fn from(outcome: &IngestOutcome) -> Self {
        if outcome.is_accepted() {
            Self::success(outcome.message())
        } else {
            Self::error(outcome.message())
        }
    }
}

/// POST a webhook event
#[utoipa::path(
    post,
    path = "/webhook",
    params(
        ("webhook-id" = Option<String>, Header, description = "Unique message id (also accepted as svix-id)"),
        ("webhook-timestamp" = Option<String>, Header, description = "Epoch seconds or ISO-8601 send time (also accepted as svix-timestamp)"),
        ("webhook-signature" = Option<String>, Header, description = "Space separated list of v1,<base64> signatures (also accepted as svix-signature)"),
    ),
    request_body(content = Object, description = "JSON event payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Event processed; see `status` for the outcome", body = WebhookResponse),
    ),
    security(
        ("webhook_signature" = [])
    )
)]
pub async fn receive(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: core::result::Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse> {
    let body = body.map_err(|rejection| {
        warn!("Failed to read webhook body: {rejection}");
        rejection.body_text()
    });
    let headers = header_values(&headers);
    let ingestor = Arc::clone(&app_state.ingestor);

    // Verification and the event log append block on file I/O.
    let outcome = tokio::task::spawn_blocking(move || match body {
        Ok(body) => {
            debug!("POST /webhook with {} byte body", body.len());
            ingestor.ingest(&headers, &body)
        }
        Err(detail) => ingestor.request_parse_error(&detail),
    })
    .await??;

    Ok((StatusCode::OK, Json(WebhookResponse::from(&outcome))))
}

// Header names arrive lowercased. Values that are not visible ASCII are dropped, and
// only the first value of a repeated header is kept.
fn header_values(headers: &HeaderMap) -> HashMap<String, String> {
    let mut values = HashMap::with_capacity(headers.len());
    for (name, value) in headers {
        match value.to_str() {
            Ok(value) => {
                values
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| value.to_string());
            }
            Err(_) => debug!("Skipping non-text header value for {name}"),
        }
    }
    values
}
