//! HTTP surface: `POST /api/chat` and `GET /health`.
//!
//! The handlers are thin. They deserialise the body, hand it to the shared
//! [`ChatPipeline`], and render the result or the error envelope. Every
//! failure, including a malformed or oversized body, is reported as
//! `{"error": ..., "details": ...}` so clients only ever parse one shape.

use crate::chat::ChatPipeline;
use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::output::ChatOutput;
use crate::request::ChatRequest;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.is_client_error() {
            warn!(status = status.as_u16(), "Rejected request: {}", self);
        } else {
            error!(status = status.as_u16(), "Request failed: {}", self);
        }
        (status, Json(self.envelope())).into_response()
    }
}

/// Map an axum body rejection onto the error envelope.
fn rejection_error(rejection: JsonRejection) -> ChatError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ChatError::PayloadTooLarge(rejection.body_text())
    } else {
        ChatError::InvalidRequest(rejection.body_text())
    }
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatOutput>, ChatError> {
    let Json(request) = payload.map_err(rejection_error)?;
    let output = state.pipeline.handle(request).await?;
    Ok(Json(output))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.pipeline.config().model,
    }))
}

/// Router for a ready-made pipeline.
///
/// The body limit comes from the pipeline's configuration; CORS is fully
/// permissive because the browser frontend is served from another origin.
pub fn app(pipeline: Arc<ChatPipeline>) -> Router {
    let body_limit = pipeline.config().max_body_bytes;
    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: ChatConfig, addr: SocketAddr) -> Result<(), ChatError> {
    let model = config.model.clone();
    let pipeline = Arc::new(ChatPipeline::new(config)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ChatError::Internal(format!("failed to bind {addr}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| ChatError::Internal(e.to_string()))?;
    info!("docchat listening on http://{} (model {})", local, model);

    axum::serve(listener, app(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ChatError::Internal(format!("server error: {e}")))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
