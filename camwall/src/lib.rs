//! # camwall - camera-grid lifecycle controller
//!
//! camwall drives a multi-camera video wall: it enumerates local capture
//! devices, binds them to a fixed grid of slots, tracks the highlighted and
//! focused camera, and paints externally computed detection boxes on a
//! per-camera overlay surface.
//!
//! Everything that belongs to the host (capture devices, navigation, user
//! notifications, overlay surfaces, the web backend) sits behind a trait, so
//! the same controller runs against real cameras or the in-memory mocks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use camwall::GridController;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     camwall::logging::init_logging()?;
//!
//!     let mut grid = GridController::builder().build()?;
//!     let report = grid.initialize(21).await?;
//!     println!("{} of {} slots live", report.bound, report.slots);
//!
//!     grid.highlight(0)?;
//!     grid.render_overlay_json(
//!         r#"[{"cctv_id": "CCTV1", "detections": [{"x1": 10, "y1": 20, "x2": 50, "y2": 80, "class_id": 0}]}]"#,
//!     )?;
//!     grid.focus(0).await?;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod event;
pub mod focus_view;
pub mod host;
pub mod logging;

// Re-export core types for easy access
pub use camwall_core::{
    next_cctv_id, parse_detection_feed, BoundingBox, CameraSlot, CamwallError, CamwallResult,
    CctvId, Detection, DetectionOverlayResult, DeviceId, ErrorCategory, SelectionState,
    SlotState, SlotTable,
};

pub use camwall_media::{
    default_backend, CaptureBackend, CaptureEvent, DeviceDescriptor, DeviceKind,
    MockCaptureBackend, MockDevice, MockFailure, OverlayStyle, OverlaySurface, Rgba,
    SoftwareCanvas, SoftwareCanvasProvider, SurfaceProvider, SurfaceSize,
};

pub use camwall_remote::{
    HttpRemoteApi, LastAccessRecord, MockRemoteApi, RemoteApi, RemoteConfig,
};

pub use config::{GridConfig, DEFAULT_MAX_SLOTS};
pub use controller::{FocusOutcome, GridController, GridControllerBuilder, GridReport, OverlayReport};
pub use event::GridEvent;
pub use focus_view::FocusView;
pub use host::{
    LogNavigator, LogNotifier, Navigator, Notification, NotificationLevel, Notifier,
    RecordingNavigator, RecordingNotifier,
};
