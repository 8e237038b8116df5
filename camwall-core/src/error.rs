//! Error types for camwall

use thiserror::Error;

/// Main error type for camera-grid operations
#[derive(Error, Debug)]
pub enum CamwallError {
    /// The host refused or lacks video device enumeration
    #[error("Device enumeration failed: {reason}")]
    DeviceEnumeration {
        /// Reason reported by the host
        reason: String,
    },

    /// A stream could not be bound to a slot
    #[error("Stream bind failed for {cctv_id} (device {device_id}): {reason}")]
    StreamBind {
        /// Camera identifier of the slot
        cctv_id: String,
        /// Device that was being acquired
        device_id: String,
        /// Reason reported by the host
        reason: String,
    },

    /// Slot index does not exist in the grid
    #[error("Invalid slot index {index} (grid has {slot_count} slots)")]
    InvalidSlotIndex {
        /// Requested index
        index: usize,
        /// Number of slots in the grid
        slot_count: usize,
    },

    /// Detection result refers to a camera without a render surface
    #[error("No overlay surface for camera {cctv_id}")]
    UnknownOverlayTarget {
        /// Camera identifier from the result
        cctv_id: String,
    },

    /// Network or application-level failure of a remote call
    #[error("Remote call {endpoint} failed: {reason}")]
    RemoteCall {
        /// Endpoint path that was called
        endpoint: String,
        /// Failure description
        reason: String,
        /// Whether the failure came from the response body rather than the transport
        application_level: bool,
    },

    /// No capture device exists for a camera
    #[error("No capture device for camera {cctv_id}")]
    DeviceNotFound {
        /// Camera identifier
        cctv_id: String,
    },

    /// Camera identifier is not part of the grid
    #[error("Unknown camera: {cctv_id}")]
    UnknownCamera {
        /// Camera identifier
        cctv_id: String,
    },

    /// Camera identifier does not follow the `CCTV{n}` form
    #[error("Invalid camera id: {value}")]
    InvalidCameraId {
        /// Rejected value
        value: String,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Payload could not be decoded
    #[error("Invalid payload: {reason}")]
    InvalidPayload {
        /// Decoder message
        reason: String,
    },
}

/// Result type alias for camera-grid operations
pub type CamwallResult<T> = Result<T, CamwallError>;

impl CamwallError {
    /// Get error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CamwallError::DeviceEnumeration { .. } => "DEVICE_ENUMERATION_ERROR",
            CamwallError::StreamBind { .. } => "STREAM_BIND_ERROR",
            CamwallError::InvalidSlotIndex { .. } => "INVALID_SLOT_INDEX",
            CamwallError::UnknownOverlayTarget { .. } => "UNKNOWN_OVERLAY_TARGET",
            CamwallError::RemoteCall { .. } => "REMOTE_CALL_ERROR",
            CamwallError::DeviceNotFound { .. } => "DEVICE_NOT_FOUND",
            CamwallError::UnknownCamera { .. } => "UNKNOWN_CAMERA",
            CamwallError::InvalidCameraId { .. } => "INVALID_CAMERA_ID",
            CamwallError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            CamwallError::InvalidPayload { .. } => "INVALID_PAYLOAD",
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            CamwallError::DeviceEnumeration { .. }
            | CamwallError::StreamBind { .. }
            | CamwallError::DeviceNotFound { .. } => ErrorCategory::Device,
            CamwallError::InvalidSlotIndex { .. }
            | CamwallError::UnknownOverlayTarget { .. }
            | CamwallError::UnknownCamera { .. }
            | CamwallError::InvalidCameraId { .. } => ErrorCategory::Input,
            CamwallError::RemoteCall { .. } => ErrorCategory::Network,
            CamwallError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            CamwallError::InvalidPayload { .. } => ErrorCategory::Data,
        }
    }

    /// Whether the failure should be surfaced to the user as a notification.
    ///
    /// Overlay target misses happen once per detection cycle and only go to the log.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            CamwallError::UnknownOverlayTarget { .. } | CamwallError::InvalidPayload { .. }
        )
    }

    /// Whether retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            CamwallError::StreamBind { .. } => true,
            CamwallError::RemoteCall {
                application_level, ..
            } => !application_level,
            CamwallError::DeviceEnumeration { .. } => true,
            _ => false,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Capture device and stream failures
    Device,
    /// Stale or malformed references coming from user input
    Input,
    /// Remote endpoint failures
    Network,
    /// Configuration errors
    Configuration,
    /// Payload decoding errors
    Data,
}

impl From<serde_json::Error> for CamwallError {
    fn from(err: serde_json::Error) -> Self {
        CamwallError::InvalidPayload {
            reason: err.to_string(),
        }
    }
}
