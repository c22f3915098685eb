//! Wire contracts for the records backend and the camera board
//!
//! These types mirror the JSON bodies the two services return. They are
//! decoded structurally and otherwise passed through untouched.

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;

/// `code` value the services use for success
pub const SUCCESS_CODE: i32 = 200;

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// The payload of a successful response, if any
    pub fn into_result(self) -> crate::Result<Option<T>> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(crate::ParkwatchError::Api {
                code: self.code,
                msg: self.msg,
            })
        }
    }

    /// The payload of a successful response, treating a missing one as an error
    pub fn into_data(self) -> crate::Result<T> {
        let code = self.code;
        self.into_result()?.ok_or_else(|| crate::ParkwatchError::Api {
            code,
            msg: "response carried no data".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Camera board
// ---------------------------------------------------------------------------

/// The camera as reported by the board or the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    pub id: i64,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub interface_type: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_num: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// Payload of `GET /api/camera/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStatusData {
    pub camera: CameraInfo,
    #[serde(default)]
    pub stream_url: String,
}

/// Body of `POST /api/camera/toggle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub connect: bool,
}

/// A video device detected on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDevice {
    pub device_path: String,
    pub device_num: i64,
    #[serde(default)]
    pub resolution: Vec<u32>,
}

/// Payload of `GET /api/camera/devices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDeviceList {
    #[serde(default)]
    pub devices: Vec<CameraDevice>,
    #[serde(default)]
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Camera registry
// ---------------------------------------------------------------------------

/// Query for `GET /api/camera/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraListParams {
    pub page_num: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

impl Default for CameraListParams {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: 10,
            serial: None,
            interface_type: None,
            connected: None,
        }
    }
}

impl CameraListParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("pageNum", self.page_num.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(serial) = &self.serial {
            query.push(("serial", serial.clone()));
        }
        if let Some(interface_type) = &self.interface_type {
            query.push(("interfaceType", interface_type.clone()));
        }
        if let Some(connected) = self.connected {
            query.push(("connected", connected.to_string()));
        }
        query
    }
}

/// Page of cameras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraListResponse {
    #[serde(default)]
    pub records: Vec<CameraInfo>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub pages: u64,
}

// ---------------------------------------------------------------------------
// Violation history
// ---------------------------------------------------------------------------

/// One recorded parking violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    pub id: i64,
    pub camera_id: i64,
    /// File name only; the image host is configured elsewhere
    #[serde(default)]
    pub image_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub location: String,
}

impl ViolationRecord {
    /// The detector confidence; the backend does not tag its scale
    pub fn confidence(&self) -> Confidence {
        Confidence::from_raw(self.confidence)
    }
}

/// Filters for the violation list and export endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationQueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_id: Option<i64>,
}

impl ViolationQueryParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page_num) = self.page_num {
            query.push(("pageNum", page_num.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("pageSize", page_size.to_string()));
        }
        if let Some(location) = &self.location {
            query.push(("location", location.clone()));
        }
        if let Some(start_date) = &self.start_date {
            query.push(("startDate", start_date.clone()));
        }
        if let Some(end_date) = &self.end_date {
            query.push(("endDate", end_date.clone()));
        }
        if let Some(camera_id) = self.camera_id {
            query.push(("cameraId", camera_id.to_string()));
        }
        query
    }
}

/// Page of violation records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationListResponse {
    #[serde(default)]
    pub records: Vec<ViolationRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub size: u64,
}

/// Totals shown on the history page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationStatistics {
    pub total_records: u64,
    pub today_records: u64,
    pub avg_confidence: f64,
    pub total_cameras: u64,
}

// ---------------------------------------------------------------------------
// Home page
// ---------------------------------------------------------------------------

/// Totals shown on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatistics {
    pub total_records: u64,
    pub today_records: u64,
    pub avg_confidence: f64,
    #[serde(default)]
    pub camera_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemUpdateKind {
    Update,
    Feature,
    Notice,
    Optimize,
}

/// Entry in the system changelog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemUpdate {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: SystemUpdateKind,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub time: String,
}

// ---------------------------------------------------------------------------
// Statistics page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub week_violation_count: u64,
    pub total_violations: u64,
    pub avg_confidence: f64,
    pub camera_total: u64,
    pub camera_online: u64,
    pub camera_offline: u64,
    pub week_compare_rate: f64,
    pub month_compare_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrendData {
    pub week: String,
    pub violation_count: u64,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationTypeData {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDistributionData {
    pub location: String,
    pub count: u64,
    pub percentage: f64,
}

/// Everything the statistics page renders, in one payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllStatsData {
    pub overview: OverviewStats,
    #[serde(default)]
    pub weekly_trend: Vec<WeeklyTrendData>,
    #[serde(default)]
    pub violation_type: Vec<ViolationTypeData>,
    #[serde(default)]
    pub location_distribution: Vec<LocationDistributionData>,
}
