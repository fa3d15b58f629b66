use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind};

use crate::controller::webhook_controller::WebhookResponse;

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// Webhook senders only ever see 200; the failure is reported in the body and the
// details stay in the log.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self.0.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::EventLog) => {
                error!("Event log unavailable while processing webhook: {}", self.0);
                "event log unavailable"
            }
            DomainErrorKind::Internal(InternalErrorKind::Config) => {
                error!("Webhook verifier misconfigured: {}", self.0);
                "internal error"
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(_))
            | DomainErrorKind::External(ExternalErrorKind::Network)
            | DomainErrorKind::External(ExternalErrorKind::Other(_)) => {
                error!("Internal error while processing webhook: {}", self.0);
                "internal error"
            }
        };

        (StatusCode::OK, Json(WebhookResponse::error(message))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_internal_errors_answer_200_with_error_status() {
        let err: Error = std::io::Error::other("disk full").into();

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({"status": "error", "message": "event log unavailable"})
        );
    }
}
