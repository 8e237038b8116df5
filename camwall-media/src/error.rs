//! Capture and rendering error types
//!
//! Backends report failures as [`MediaError`]. The grid controller converts
//! them into [`CamwallError`] at the point where it knows which slot or
//! operation was affected.

use camwall_core::{CamwallError, CctvId, DeviceId};
use thiserror::Error;

/// Main error type for capture backends and render surfaces
#[derive(Error, Debug)]
pub enum MediaError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Device enumeration failed
    #[error("Device enumeration failed: {reason}")]
    DeviceEnumerationFailed {
        /// Failure reason
        reason: String,
    },

    /// Device not found error
    #[error("Device not found: {device_id}")]
    DeviceNotFound {
        /// Device identifier
        device_id: String,
    },

    /// Device is held by another consumer
    #[error("Device busy: {device_id}")]
    DeviceBusy {
        /// Device identifier
        device_id: String,
    },

    /// Permission denied error
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// Platform device-handle limit reached
    #[error("Resource not available: {resource}")]
    ResourceNotAvailable {
        /// Resource name
        resource: String,
    },

    /// Unsupported platform error
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform {
        /// Platform name
        platform: String,
    },

    /// Invalid state for operation
    #[error("Invalid state: {message}")]
    InvalidState {
        /// State error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::Io { .. } => true,
            MediaError::DeviceBusy { .. } => true,
            MediaError::ResourceNotAvailable { .. } => true,
            MediaError::PermissionDenied { .. } => false,
            MediaError::UnsupportedPlatform { .. } => false,
            _ => false,
        }
    }

    /// Convert an enumeration failure into the grid taxonomy
    pub fn into_enumeration_error(self) -> CamwallError {
        CamwallError::DeviceEnumeration {
            reason: self.to_string(),
        }
    }

    /// Convert a stream acquisition failure for one slot into the grid taxonomy
    pub fn into_bind_error(self, cctv_id: &CctvId, device_id: &DeviceId) -> CamwallError {
        CamwallError::StreamBind {
            cctv_id: cctv_id.to_string(),
            device_id: device_id.to_string(),
            reason: self.to_string(),
        }
    }
}
