//! Parkwatch - Parking violation camera monitoring client
//!
//! Typed REST wrappers for the violation records backend and the camera
//! board, a cached view of the camera's connection status, and a small JSON
//! status server for dashboards.

pub mod api;
pub mod camera_store;
pub mod client;
pub mod confidence;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;

pub use config::{load_config, Config};
pub use error::{FetchFailure, ParkwatchError, Result};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::camera_store::CameraStore;
use crate::client::{BackendClient, CameraClient};
use crate::io::{HttpClient, ReqwestHttpClient};

/// Everything one client session talks through
#[derive(Debug)]
pub struct Session {
    pub backend: BackendClient,
    pub camera: CameraClient,
    pub store: Arc<CameraStore>,
}

impl Session {
    /// Build clients for both services from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let backend_http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(
            config.backend.request_timeout,
        )?);
        let camera_http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(
            config.camera.request_timeout,
        )?);
        Ok(Self::with_http(config, backend_http, camera_http))
    }

    /// Build a session over caller-supplied transports
    pub fn with_http(
        config: &Config,
        backend_http: Arc<dyn HttpClient>,
        camera_http: Arc<dyn HttpClient>,
    ) -> Self {
        let backend = BackendClient::new(config.backend.base_url.clone(), backend_http);
        let camera = CameraClient::new(config.camera.base_url.clone(), Arc::clone(&camera_http));
        let store = Arc::new(CameraStore::from_config(
            CameraClient::new(config.camera.base_url.clone(), camera_http),
            &config.camera,
        ));
        Self {
            backend,
            camera,
            store,
        }
    }
}

/// Keep the camera store warm until cancelled
pub async fn poll_loop(store: Arc<CameraStore>, interval: Duration, cancel: CancellationToken) {
    loop {
        let view = store.get_status().await;
        tracing::debug!("Camera poll: {} ({:?})", view.status, view);

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Camera poll loop cancelled");
                break;
            }
        }
    }
}

/// Run the status server until ctrl-c
pub async fn serve(config: Config) -> Result<()> {
    let session = Session::new(&config)?;
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    serve_until(config, session.store, cancel).await
}

/// Run the status server and poll loop until `cancel` fires
pub async fn serve_until(
    config: Config,
    store: Arc<CameraStore>,
    cancel: CancellationToken,
) -> Result<()> {
    store.init().await;

    let poller = tokio::spawn(poll_loop(
        Arc::clone(&store),
        config.dashboard.poll_interval,
        cancel.clone(),
    ));

    let result = run_server(&config, store, &cancel).await;

    cancel.cancel();
    if let Err(e) = poller.await {
        tracing::error!("Camera poll loop ended abnormally: {}", e);
    }
    tracing::info!("Status server stopped");
    result
}

async fn run_server(
    config: &Config,
    store: Arc<CameraStore>,
    cancel: &CancellationToken,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.dashboard.port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        ParkwatchError::Config(format!(
            "Failed to bind status server to port {}: {}",
            config.dashboard.port, e
        ))
    })?;
    tracing::info!("Status server listening on http://{}", addr);

    let router = dashboard::build_router(store);
    let cancel_for_server = cancel.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel_for_server.cancelled().await;
        })
        .await?;
    Ok(())
}
