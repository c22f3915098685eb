//! Configuration types for the parkwatch client

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Records backend (violation history, statistics, camera registry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Camera board serving the live status of the single edge camera
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Cached status older than this is refetched before being served
    #[serde(default = "default_staleness_window", with = "humantime_serde")]
    pub staleness_window: Duration,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_url: default_camera_url(),
            request_timeout: default_request_timeout(),
            staleness_window: default_staleness_window(),
        }
    }
}

/// Status server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: default_dashboard_port(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_camera_url() -> String {
    "http://192.168.76.178:5050".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_staleness_window() -> Duration {
    Duration::from_secs(5)
}

fn default_dashboard_port() -> u16 {
    11120
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::ParkwatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject settings the client cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        for (section, url) in [
            ("backend", &self.backend.base_url),
            ("camera", &self.camera.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(crate::ParkwatchError::Config(format!(
                    "{section}.base_url must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.camera.request_timeout.is_zero() || self.backend.request_timeout.is_zero() {
            return Err(crate::ParkwatchError::Config(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.dashboard.poll_interval.is_zero() {
            return Err(crate::ParkwatchError::Config(
                "dashboard.poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
