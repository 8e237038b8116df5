//! Events emitted by the grid controller

use camwall_core::{CamwallError, CctvId, DeviceId};

/// Grid events observable through [`crate::GridController::events`]
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A slot received a live stream
    SlotBound {
        /// Slot index
        index: usize,
        /// Camera id of the slot
        cctv_id: CctvId,
        /// Device bound to the slot
        device_id: DeviceId,
    },
    /// A slot shows its placeholder
    SlotEmpty {
        /// Slot index
        index: usize,
        /// Camera id of the slot
        cctv_id: CctvId,
    },
    /// Highlight moved to a slot
    Highlighted {
        /// Slot index
        index: usize,
    },
    /// Last access was recorded and the focus view was opened
    Focused {
        /// Focused camera
        cctv_id: CctvId,
        /// Navigation target
        path: String,
    },
    /// Detections were painted on a camera's overlay
    OverlayRendered {
        /// Camera whose surface was repainted
        cctv_id: CctvId,
        /// Number of boxes drawn
        detections: usize,
    },
    /// The detection job was started
    DetectionStarted,
    /// An operation failed
    Error {
        /// Programmatic error code
        code: &'static str,
        /// Error message
        message: String,
        /// Whether retrying may succeed
        recoverable: bool,
    },
}

impl GridEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            GridEvent::SlotBound { .. } => "slot_bound",
            GridEvent::SlotEmpty { .. } => "slot_empty",
            GridEvent::Highlighted { .. } => "highlighted",
            GridEvent::Focused { .. } => "focused",
            GridEvent::OverlayRendered { .. } => "overlay_rendered",
            GridEvent::DetectionStarted => "detection_started",
            GridEvent::Error { .. } => "error",
        }
    }

    /// Check if this is a slot lifecycle event
    pub fn is_slot_event(&self) -> bool {
        matches!(self, GridEvent::SlotBound { .. } | GridEvent::SlotEmpty { .. })
    }

    /// Check if this is an error event
    pub fn is_error_event(&self) -> bool {
        matches!(self, GridEvent::Error { .. })
    }
}

impl From<&CamwallError> for GridEvent {
    fn from(err: &CamwallError) -> Self {
        GridEvent::Error {
            code: err.error_code(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
        }
    }
}
