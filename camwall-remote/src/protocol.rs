//! Endpoint paths and wire types of the camwall web backend

use camwall_core::CctvId;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Path that starts the server-side detection job
pub const START_DETECTION_PATH: &str = "/start-detection";

/// Format the backend uses for local timestamps
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Path recording that `cctv_id` was opened
pub fn update_last_access_path(cctv_id: &CctvId) -> String {
    format!("/update-last-access/{}", cctv_id)
}

/// Path of the single-camera view for `cctv_id`
pub fn focus_view_path(cctv_id: &CctvId) -> String {
    format!("/focus-webcam/{}", cctv_id)
}

/// Body of `POST /update-last-access/{cctv_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAccessResponse {
    /// Whether the access was recorded
    pub success: bool,
    /// Recorded access time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_access: Option<String>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LastAccessResponse {
    /// Successful response
    pub fn ok(last_access: impl Into<String>) -> Self {
        Self {
            success: true,
            last_access: Some(last_access.into()),
            message: None,
        }
    }

    /// Application-level failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            last_access: None,
            message: Some(message.into()),
        }
    }

    /// Recorded access time, when the backend sent a parseable one.
    ///
    /// Accepts the backend's local `YYYY-MM-DD HH:MM:SS` form and RFC 3339.
    pub fn last_access_time(&self) -> Option<NaiveDateTime> {
        let raw = self.last_access.as_deref()?.trim();
        NaiveDateTime::parse_from_str(raw, LOCAL_TIMESTAMP_FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
    }
}

/// Confirmed last-access record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastAccessRecord {
    /// Camera that was recorded
    pub cctv_id: CctvId,
    /// Raw timestamp as sent by the backend
    pub last_access: Option<String>,
    /// Parsed timestamp
    pub recorded_at: Option<NaiveDateTime>,
}
