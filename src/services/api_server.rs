// src/services/api_server.rs
//! HTTP surface of the gateway.
//!
//! Built with Axum. Endpoints:
//! - `POST /api/webhooks/revolut`: webhook entry point behind the [`EventGate`]
//! - `GET /api/webhooks/info`: whether a webhook secret is configured and which events are handled
//! - `GET /api/health`: liveness and outbound authentication mode

use crate::errors::GatewayError;
use crate::models::webhook::Acknowledgement;
use crate::services::event_gate::{EventGate, SIGNATURE_HEADER};
use crate::services::revolut_client::RevolutClient;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const SERVICE_NAME: &str = "Revolut API Integration";

/// Response for the webhook configuration probe
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WebhookInfoResponse {
    configured: bool,
    supported_events: Vec<String>,
}

/// Response for the health check
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    timestamp: String,
    service: String,
    version: String,
    outbound_auth: String,
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Verification and dispatch of inbound webhooks
    event_gate: Arc<EventGate>,

    /// Authenticated client for the remote API
    revolut_client: Arc<RevolutClient>,

    /// Allowed browser origin; any origin when `None`
    cors_origin: Option<String>,
}

impl ApiServer {
    pub fn new(
        event_gate: EventGate,
        revolut_client: RevolutClient,
        cors_origin: Option<String>,
    ) -> Self {
        ApiServer {
            event_gate: Arc::new(event_gate),
            revolut_client: Arc::new(revolut_client),
            cors_origin,
        }
    }

    /// Builds the router with all routes and middleware attached.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/webhooks/revolut", post(Self::revolut_webhook_handler))
            .route("/api/webhooks/info", get(Self::webhook_info_handler))
            .route("/api/health", get(Self::health_handler))
            .layer(self.cors_layer())
            .with_state(Arc::new(self.clone()))
    }

    /// Binds `addr` and serves until the process is stopped.
    ///
    /// # Errors
    /// Returns [`GatewayError::Server`] if the address cannot be bound or the
    /// server loop fails.
    pub async fn run(&self, addr: SocketAddr) -> Result<(), GatewayError> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("API server listening on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    fn cors_layer(&self) -> CorsLayer {
        let origin = match self
            .cors_origin
            .as_deref()
            .filter(|origin| *origin != "*")
            .map(HeaderValue::from_str)
        {
            Some(Ok(origin)) => AllowOrigin::exact(origin),
            Some(Err(_)) => {
                log::warn!("Ignoring invalid CORS_ORIGIN; allowing any origin");
                AllowOrigin::from(Any)
            }
            None => AllowOrigin::from(Any),
        };
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    // =====================
    // Webhook Handlers
    // =====================

    /// Receives a webhook delivery from the remote party
    ///
    /// # Endpoint
    /// POST /api/webhooks/revolut
    ///
    /// # Request
    /// Raw JSON body plus `X-Revolut-Signature` (hex HMAC-SHA256 of the body)
    ///
    /// # Responses
    /// - 200 OK: Acknowledgement (`processed` or `unknown_event`)
    /// - 400 Bad Request: Body verified but is not an event
    /// - 401 Unauthorized: Missing or invalid signature
    async fn revolut_webhook_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Json<Acknowledgement>, GatewayError> {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());

        state.event_gate.handle(&body, signature).map(Json)
    }

    /// GET /api/webhooks/info
    async fn webhook_info_handler(State(state): State<Arc<ApiServer>>) -> impl IntoResponse {
        Json(WebhookInfoResponse {
            configured: state.event_gate.is_configured(),
            supported_events: state.event_gate.supported_events(),
        })
    }

    // =====================
    // Health
    // =====================

    /// GET /api/health
    async fn health_handler(State(state): State<Arc<ApiServer>>) -> impl IntoResponse {
        let outbound_auth = if state.revolut_client.authenticator().is_signing() {
            "signed"
        } else {
            "unauthenticated"
        };

        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            outbound_auth: outbound_auth.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::assertion_issuer::AssertionIssuer;
    use crate::auth::key_management::SharedSecret;
    use crate::auth::request_authenticator::RequestAuthenticator;
    use crate::auth::signature_verifier::SignatureVerifier;
    use crate::services::event_gate::EventDispatcher;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const TRANSACTION_BODY: &str = r#"{"event":"TransactionCreated","data":{"id":"tx_1"}}"#;
    const TRANSACTION_SIGNATURE: &str =
        "3f67ab6f769751e02a32ea0ec5e029eeaaf9f8e39986c7d4f6fc9237ba5c9440";

    fn server(secret: Option<&str>) -> ApiServer {
        let gate = EventGate::new(
            SignatureVerifier::new(secret.map(SharedSecret::new)),
            EventDispatcher::with_default_handlers(),
        );
        let issuer = AssertionIssuer::new(None, "client-123", "https://revolut.com", 3600);
        let client = RevolutClient::new(
            "https://b2b.revolut.com/api/1.0",
            Arc::new(RequestAuthenticator::new(issuer, 60)),
        )
        .unwrap();
        ApiServer::new(gate, client, None)
    }

    fn webhook(body: &str, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/webhooks/revolut")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header("X-Revolut-Signature", signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signed_webhook_is_processed() {
        let response = server(Some("s3cret"))
            .router()
            .oneshot(webhook(TRANSACTION_BODY, Some(TRANSACTION_SIGNATURE)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "processed", "event": "TransactionCreated", "transactionId": "tx_1"})
        );
    }

    #[tokio::test]
    async fn test_bad_signature_is_unauthorized_without_details() {
        let wrong = "a".repeat(64);
        let response = server(Some("s3cret"))
            .router()
            .oneshot(webhook(TRANSACTION_BODY, Some(&wrong)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body, json!({"error": "Invalid webhook signature"}));
    }

    #[tokio::test]
    async fn test_missing_signature_header_is_unauthorized() {
        let response = server(Some("s3cret"))
            .router()
            .oneshot(webhook(TRANSACTION_BODY, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unconfigured_secret_rejects() {
        let response = server(None)
            .router()
            .oneshot(webhook(TRANSACTION_BODY, Some(TRANSACTION_SIGNATURE)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_event_is_acknowledged() {
        let body = r#"{"event":"FooHappened","data":{}}"#;
        let signature = crate::utils::crypto::hmac_sha256_hex(b"s3cret", body.as_bytes());

        let response = server(Some("s3cret"))
            .router()
            .oneshot(webhook(body, Some(&signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "unknown_event", "event": "FooHappened"})
        );
    }

    #[tokio::test]
    async fn test_webhook_info_reports_configuration() {
        let request = Request::builder()
            .uri("/api/webhooks/info")
            .body(Body::empty())
            .unwrap();
        let response = server(None).router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["configured"], json!(false));
        assert_eq!(body["supportedEvents"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_health_reports_outbound_mode() {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = server(Some("s3cret")).router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["outboundAuth"], "unauthenticated");
    }
}
