//! Cached view of the camera board's connection status
//!
//! The store keeps the last successful status response together with the
//! instant it was fetched. Reads within the staleness window are served from
//! the cache; older (or absent) entries trigger a refresh first. A failed
//! refresh never touches the cached envelope.
//!
//! Refreshes are serialized by `refresh_guard`. A caller that finds a refresh
//! already in flight waits for it and takes its outcome instead of issuing a
//! second request. Every request is bounded by `request_timeout`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::api::{CameraInfo, CameraStatusData};
use crate::client::CameraClient;
use crate::config::CameraConfig;
use crate::error::FetchFailure;
use crate::ParkwatchError;

/// Default age after which a cached status is refetched
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(5);

/// The last successful status response
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEnvelope {
    pub camera: CameraInfo,
    pub stream_url: String,
    pub fetched_at: Instant,
}

/// Freshness of the cached envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

impl ConnectionStatus {
    fn from_connected(connected: bool) -> Self {
        if connected {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Online => write!(f, "Online"),
            ConnectionStatus::Offline => write!(f, "Offline"),
        }
    }
}

/// What dashboards render for the camera
///
/// The board serves exactly one camera, so the counts are 0/1 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStatusView {
    pub connected: bool,
    pub online_cameras: u32,
    pub total_cameras: u32,
    pub status: ConnectionStatus,
}

impl CameraStatusView {
    fn from_connected(connected: bool) -> Self {
        Self {
            connected,
            online_cameras: u32::from(connected),
            total_cameras: 1,
            status: ConnectionStatus::from_connected(connected),
        }
    }
}

#[derive(Debug)]
struct Inner {
    envelope: Option<CacheEnvelope>,
    /// Number of refreshes that have finished, successful or not
    completed: u64,
    last_outcome: Result<(), FetchFailure>,
}

/// Session-scoped cache of one camera's status
pub struct CameraStore {
    client: CameraClient,
    staleness_window: Duration,
    request_timeout: Duration,
    inner: RwLock<Inner>,
    refresh_guard: Mutex<()>,
}

impl fmt::Debug for CameraStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraStore")
            .field("client", &self.client)
            .field("staleness_window", &self.staleness_window)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CameraStore {
    pub fn new(client: CameraClient, staleness_window: Duration, request_timeout: Duration) -> Self {
        Self {
            client,
            staleness_window,
            request_timeout,
            inner: RwLock::new(Inner {
                envelope: None,
                completed: 0,
                last_outcome: Ok(()),
            }),
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn from_config(client: CameraClient, config: &CameraConfig) -> Self {
        Self::new(client, config.staleness_window, config.request_timeout)
    }

    /// Initial fetch at session start; failure leaves the store empty
    pub async fn init(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Initial camera status fetch failed: {}", e);
        }
    }

    /// Fetch the current status, joining a refresh already in flight
    pub async fn refresh(&self) -> Result<(), FetchFailure> {
        let seen = self.inner.read().await.completed;
        let _guard = self.refresh_guard.lock().await;
        {
            let inner = self.inner.read().await;
            if inner.completed != seen {
                tracing::debug!("Joined camera status refresh that finished while waiting");
                return inner.last_outcome.clone();
            }
        }
        self.refresh_locked().await
    }

    /// Refresh while the caller holds `refresh_guard`
    async fn refresh_locked(&self) -> Result<(), FetchFailure> {
        let fetched = self.fetch_status().await;
        let mut inner = self.inner.write().await;
        inner.completed += 1;
        let outcome = match fetched {
            Ok(data) => {
                tracing::debug!(
                    "Camera {} status refreshed: connected={}",
                    data.camera.serial,
                    data.camera.connected
                );
                inner.envelope = Some(CacheEnvelope {
                    camera: data.camera,
                    stream_url: data.stream_url,
                    fetched_at: Instant::now(),
                });
                Ok(())
            }
            Err(failure) => {
                tracing::debug!("Camera status refresh failed: {}", failure);
                Err(failure)
            }
        };
        inner.last_outcome = outcome.clone();
        outcome
    }

    async fn fetch_status(&self) -> Result<CameraStatusData, FetchFailure> {
        match tokio::time::timeout(self.request_timeout, self.client.status()).await {
            Err(_) => Err(FetchFailure::Timeout(self.request_timeout)),
            Ok(Err(ParkwatchError::Timeout(_))) => Err(FetchFailure::Timeout(self.request_timeout)),
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(response)) => response.into_data().map_err(FetchFailure::from),
        }
    }

    pub async fn cache_state(&self) -> CacheState {
        match &self.inner.read().await.envelope {
            None => CacheState::Empty,
            Some(envelope) if envelope.fetched_at.elapsed() > self.staleness_window => {
                CacheState::Stale
            }
            Some(_) => CacheState::Fresh,
        }
    }

    /// Derived view, refreshed first when the cache is empty or stale.
    ///
    /// A failed refresh is logged and the previous envelope is served.
    pub async fn get_status(&self) -> CameraStatusView {
        let state = self.cache_state().await;
        if state != CacheState::Fresh {
            tracing::debug!("Camera status cache is {:?}, refreshing", state);
            if let Err(e) = self.refresh().await {
                tracing::warn!("Serving cached camera status after failed refresh: {}", e);
            }
        }
        CameraStatusView::from_connected(self.is_connected().await)
    }

    /// Ask the board to connect or disconnect the camera.
    ///
    /// On success the cache is resynchronized before returning the server
    /// message. On failure the cache is left alone.
    pub async fn toggle(&self, connect: bool) -> Result<String, FetchFailure> {
        let _guard = self.refresh_guard.lock().await;
        tracing::debug!("Toggling camera connect={}", connect);

        let response = match tokio::time::timeout(self.request_timeout, self.client.toggle(connect))
            .await
        {
            Err(_) | Ok(Err(ParkwatchError::Timeout(_))) => {
                return Err(FetchFailure::Timeout(self.request_timeout))
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            tracing::debug!(
                "Camera toggle rejected: code={} msg={:?}",
                response.code,
                response.msg
            );
            return Err(FetchFailure::Rejected {
                code: response.code,
                msg: response.msg,
            });
        }

        if let Err(e) = self.refresh_locked().await {
            tracing::warn!("Camera toggled but status resync failed: {}", e);
        }
        Ok(response.msg)
    }

    pub async fn envelope(&self) -> Option<CacheEnvelope> {
        self.inner.read().await.envelope.clone()
    }

    pub async fn camera(&self) -> Option<CameraInfo> {
        self.inner
            .read()
            .await
            .envelope
            .as_ref()
            .map(|e| e.camera.clone())
    }

    pub async fn stream_url(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .envelope
            .as_ref()
            .map(|e| e.stream_url.clone())
    }

    pub async fn last_fetched_at(&self) -> Option<Instant> {
        self.inner.read().await.envelope.as_ref().map(|e| e.fetched_at)
    }

    /// Cached connection flag; an empty cache reads as disconnected
    pub async fn is_connected(&self) -> bool {
        self.inner
            .read()
            .await
            .envelope
            .as_ref()
            .is_some_and(|e| e.camera.connected)
    }

    pub async fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus::from_connected(self.is_connected().await)
    }
}
