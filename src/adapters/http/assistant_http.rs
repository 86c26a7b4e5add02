//! Assistant HTTP Server.
//!
//! JSON endpoints for asking questions and reading daily usage. The caller
//! is identified by the `x-user-id` header set by the fronting platform.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::{ServerConfig, UserId};
use crate::services::{AskRequest, AskResponse, AssistantError, AssistantService, UsageReport};

/// Header carrying the authenticated caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Configuration for the assistant HTTP server.
#[derive(Debug, Clone)]
pub struct AssistantHttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for AssistantHttpConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for AssistantHttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        let (status, code) = match &err {
            AssistantError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            AssistantError::BadInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AssistantError::QuotaExceeded { .. } => (StatusCode::TOO_MANY_REQUESTS, "QUOTA_EXCEEDED"),
            AssistantError::GenerationFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "GENERATION_FAILED"),
            AssistantError::Storage(e) => {
                tracing::error!(error = %e, "assistant storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
        };
        api_error(status, code, err.to_string())
    }
}

/// Shared state for the assistant HTTP server.
struct AppState {
    service: Arc<AssistantService>,
}

/// Build the assistant router.
pub fn build_router(service: Arc<AssistantService>, enable_cors: bool) -> Router {
    let state = Arc::new(AppState { service });

    let app = Router::new()
        .route("/api/assistant/ask", post(ask))
        .route("/api/assistant/usage", get(usage))
        .route("/health", get(health_check))
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// Assistant HTTP Server.
pub struct AssistantHttpServer {
    config: AssistantHttpConfig,
    service: Arc<AssistantService>,
}

impl AssistantHttpServer {
    pub fn new(service: Arc<AssistantService>, config: AssistantHttpConfig) -> Self {
        Self { config, service }
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = build_router(self.service, self.config.enable_cors);

        tracing::info!("Assistant HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

fn caller_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<UserId>().ok())
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Authentication required"))
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AskResponse>, ApiError> {
    let user_id = caller_id(&headers)?;

    if let Some(reason) = state.service.unavailable_reason() {
        return Err(AssistantError::ServiceUnavailable(reason).into());
    }

    let request: AskRequest = serde_json::from_slice(&body)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Invalid JSON"))?;

    let response = state.service.ask(user_id, request).await?;
    Ok(Json(response))
}

async fn usage(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UsageReport>, ApiError> {
    let user_id = caller_id(&headers)?;
    let report = state.service.usage(user_id).await?;
    Ok(Json(report))
}
