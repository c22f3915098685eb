//! REST client wrappers for the records backend and the camera board
//!
//! One method per endpoint. Each forwards its parameters, decodes the
//! `{ code, msg, data }` envelope and hands it back without interpreting
//! `code`; callers decide what a non-success code means to them.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    AllStatsData, ApiResponse, CameraDeviceList, CameraInfo, CameraListParams,
    CameraListResponse, CameraStatusData, IndexStatistics, OverviewStats, SystemUpdate,
    ToggleRequest, ViolationListResponse, ViolationQueryParams, ViolationRecord,
    ViolationStatistics,
};
use crate::io::{HttpClient, HttpResponse};
use crate::ParkwatchError;

/// Number of records the home page shows when no limit is given
pub const DEFAULT_LATEST_LIMIT: u32 = 6;

/// How much of an unparseable error body is kept in the error message
const ERROR_SNIPPET_CHARS: usize = 200;

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn to_json<B: Serialize>(body: &B) -> crate::Result<String> {
    Ok(serde_json::to_string(body)?)
}

/// Decode an envelope, falling back to an HTTP error when a failed request
/// did not even produce one
fn decode<T: DeserializeOwned>(url: &str, response: HttpResponse) -> crate::Result<ApiResponse<T>> {
    match serde_json::from_slice::<ApiResponse<T>>(&response.body) {
        Ok(envelope) => {
            tracing::debug!("{} -> code={} msg={:?}", url, envelope.code, envelope.msg);
            Ok(envelope)
        }
        Err(e) if !response.is_success() => {
            tracing::debug!("{} -> status {} without envelope: {}", url, response.status, e);
            let body = response.body_text();
            let snippet: String = body.trim().chars().take(ERROR_SNIPPET_CHARS).collect();
            Err(ParkwatchError::Http(format!(
                "{} returned status {}: {}",
                url, response.status, snippet
            )))
        }
        Err(e) => Err(ParkwatchError::Json(e)),
    }
}

fn borrow_query<'a>(query: &'a [(&'static str, String)]) -> Vec<(&'a str, &'a str)> {
    query.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

/// Client for the records backend
pub struct BackendClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into();
        tracing::debug!("Created BackendClient at {}", base_url);
        Self { base_url, http }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> crate::Result<ApiResponse<T>> {
        let url = join_url(&self.base_url, path);
        let response = self.http.get(&url, &borrow_query(query)).await?;
        decode(&url, response)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &str,
    ) -> crate::Result<ApiResponse<T>> {
        let url = join_url(&self.base_url, path);
        let response = self.http.post_json(&url, body).await?;
        decode(&url, response)
    }

    // -- violation history --------------------------------------------------

    pub async fn violation_list(
        &self,
        params: &ViolationQueryParams,
    ) -> crate::Result<ApiResponse<ViolationListResponse>> {
        self.get("/api/history/list", &params.to_query()).await
    }

    pub async fn violation_stats(&self) -> crate::Result<ApiResponse<ViolationStatistics>> {
        self.get("/api/history/stats", &[]).await
    }

    pub async fn violation_detail(&self, id: i64) -> crate::Result<ApiResponse<ViolationRecord>> {
        self.get(&format!("/api/history/detail/{}", id), &[]).await
    }

    /// Spreadsheet of the matching records, as raw bytes
    pub async fn export_violations(&self, params: &ViolationQueryParams) -> crate::Result<Vec<u8>> {
        let url = join_url(&self.base_url, "/api/history/export");
        let response = self.http.post_json(&url, &to_json(params)?).await?;
        if !response.is_success() {
            return Err(ParkwatchError::Http(format!(
                "{} returned status {}",
                url, response.status
            )));
        }
        tracing::debug!("Exported {} bytes of violation records", response.body.len());
        Ok(response.body)
    }

    // -- home page -------------------------------------------------------------

    pub async fn index_statistics(&self) -> crate::Result<ApiResponse<IndexStatistics>> {
        self.get("/api/index/statistics", &[]).await
    }

    pub async fn latest_records(
        &self,
        limit: u32,
    ) -> crate::Result<ApiResponse<Vec<ViolationRecord>>> {
        self.get(&format!("/api/index/latest/{}", limit), &[]).await
    }

    pub async fn system_updates(&self) -> crate::Result<ApiResponse<Vec<SystemUpdate>>> {
        self.get("/api/index/updates", &[]).await
    }

    // -- camera registry -------------------------------------------------------

    pub async fn camera_list(
        &self,
        params: &CameraListParams,
    ) -> crate::Result<ApiResponse<CameraListResponse>> {
        self.get("/api/camera/list", &params.to_query()).await
    }

    pub async fn camera_detail(&self, id: i64) -> crate::Result<ApiResponse<CameraInfo>> {
        self.get(&format!("/api/camera/{}", id), &[]).await
    }

    pub async fn add_camera(
        &self,
        camera: &serde_json::Value,
    ) -> crate::Result<ApiResponse<serde_json::Value>> {
        self.post("/api/camera/add", &to_json(camera)?).await
    }

    pub async fn update_camera(
        &self,
        id: i64,
        camera: &serde_json::Value,
    ) -> crate::Result<ApiResponse<serde_json::Value>> {
        let url = join_url(&self.base_url, &format!("/api/camera/{}", id));
        let response = self.http.put_json(&url, &to_json(camera)?).await?;
        decode(&url, response)
    }

    pub async fn delete_camera(&self, id: i64) -> crate::Result<ApiResponse<serde_json::Value>> {
        let url = join_url(&self.base_url, &format!("/api/camera/{}", id));
        let response = self.http.delete(&url).await?;
        decode(&url, response)
    }

    pub async fn restart_camera(&self) -> crate::Result<ApiResponse<serde_json::Value>> {
        self.post("/api/camera/restart", "{}").await
    }

    // -- statistics page -------------------------------------------------------

    pub async fn overview_stats(&self) -> crate::Result<ApiResponse<OverviewStats>> {
        self.get("/api/data/overview", &[]).await
    }

    pub async fn all_stats(&self) -> crate::Result<ApiResponse<AllStatsData>> {
        self.get("/api/data/all", &[]).await
    }
}

/// Client for the camera board
pub struct CameraClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for CameraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CameraClient {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into();
        tracing::debug!("Created CameraClient at {}", base_url);
        Self { base_url, http }
    }

    pub async fn status(&self) -> crate::Result<ApiResponse<CameraStatusData>> {
        let url = join_url(&self.base_url, "/api/camera/status");
        let response = self.http.get(&url, &[]).await?;
        decode(&url, response)
    }

    pub async fn toggle(&self, connect: bool) -> crate::Result<ApiResponse<serde_json::Value>> {
        let url = join_url(&self.base_url, "/api/camera/toggle");
        let body = to_json(&ToggleRequest { connect })?;
        let response = self.http.post_json(&url, &body).await?;
        decode(&url, response)
    }

    pub async fn devices(&self) -> crate::Result<ApiResponse<CameraDeviceList>> {
        let url = join_url(&self.base_url, "/api/camera/devices");
        let response = self.http.get(&url, &[]).await?;
        decode(&url, response)
    }
}
