//! JSON status server over the camera store

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::{CameraInfo, ToggleRequest};
use crate::camera_store::CameraStore;
use crate::error::FetchFailure;

/// Body returned by the toggle endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleReply {
    pub success: bool,
    pub message: String,
}

/// Cached camera details and where to watch it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDetails {
    pub camera: CameraInfo,
    pub stream_url: String,
}

/// Build the status server router
pub fn build_router(store: Arc<CameraStore>) -> Router {
    Router::new()
        .route("/api/camera/status", get(status_handler))
        .route("/api/camera/info", get(info_handler))
        .route("/api/camera/toggle", post(toggle_handler))
        .route("/health", get(health_handler))
        .with_state(store)
}

async fn status_handler(State(store): State<Arc<CameraStore>>) -> impl IntoResponse {
    Json(store.get_status().await)
}

async fn info_handler(State(store): State<Arc<CameraStore>>) -> impl IntoResponse {
    // Make sure an empty or stale cache gets a chance to fill first
    store.get_status().await;
    match store.envelope().await {
        Some(envelope) => Json(CameraDetails {
            camera: envelope.camera,
            stream_url: envelope.stream_url,
        })
        .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Camera status unavailable").into_response(),
    }
}

async fn toggle_handler(
    State(store): State<Arc<CameraStore>>,
    Json(request): Json<ToggleRequest>,
) -> impl IntoResponse {
    match store.toggle(request.connect).await {
        Ok(message) => (
            StatusCode::OK,
            Json(ToggleReply {
                success: true,
                message,
            }),
        ),
        Err(failure) => {
            tracing::warn!("Camera toggle via status server failed: {}", failure);
            let status = match failure {
                FetchFailure::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                FetchFailure::Transport(_) | FetchFailure::Rejected { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            };
            (
                status,
                Json(ToggleReply {
                    success: false,
                    message: failure.message().to_string(),
                }),
            )
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
