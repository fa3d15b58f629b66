use crate::{
    controller::{health_check_controller, webhook_controller},
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Webhook Watchdog API"
        ),
        paths(
            health_check_controller::health_check,
            webhook_controller::receive,
        ),
        components(
            schemas(
                webhook_controller::WebhookResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "webhook_watchdog", description = "Receives, verifies and logs webhook events")
        )
    )]
pub struct ApiDoc;

struct SecurityAddon;

// Documents the signature header that authenticates pushed events.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "webhook_signature",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "webhook-signature",
                    "HMAC-SHA256 over {webhook-id}.{webhook-timestamp}.{body} as v1,<base64>",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhook_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn webhook_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_controller::receive))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use domain::Ingestor;
    use serde_json::Value;
    use service::EventLog;
    use tower::ServiceExt;

    fn test_app(dir: &tempfile::TempDir) -> Router {
        define_routes(AppState::new(Ingestor::unverified(EventLog::new(
            dir.path().join("watchdog.log"),
        ))))
    }

    #[tokio::test]
    async fn test_health_route() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = test_app(&dir).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"healthy");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();

        let response = test_app(&dir).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let document: Value = serde_json::from_slice(&body).unwrap();
        assert!(document["paths"]["/webhook"]["post"].is_object());
        assert!(document["components"]["securitySchemes"]["webhook_signature"].is_object());
    }

    #[tokio::test]
    async fn test_get_webhook_is_not_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder().uri("/webhook").body(Body::empty()).unwrap();

        let response = test_app(&dir).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
