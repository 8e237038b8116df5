//! # camwall core
//!
//! Model types shared by the camwall crates: camera identifiers, grid slots
//! with their binding lifecycle, selection state, detection payloads and the
//! error taxonomy every operation reports through.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod cctv;
pub mod detection;
pub mod error;
pub mod grid;
pub mod selection;
pub mod slot;

// Re-export main types
pub use cctv::{next_cctv_id, CctvId};
pub use detection::{parse_detection_feed, BoundingBox, Detection, DetectionOverlayResult};
pub use error::{CamwallError, CamwallResult, ErrorCategory};
pub use grid::SlotTable;
pub use selection::SelectionState;
pub use slot::{CameraSlot, DeviceId, SlotState};
