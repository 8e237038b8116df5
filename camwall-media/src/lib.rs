//! # camwall media
//!
//! Capture device backends and overlay render surfaces for the camwall grid.
//! The grid only talks to the traits defined here; which cameras exist and
//! where the overlays end up is decided by the host.

#![warn(clippy::all)]

pub mod canvas;
pub mod capture;
pub mod error;
pub mod overlay;

// Re-export main types
pub use canvas::{SharedCanvas, SoftwareCanvas, SoftwareCanvasProvider, TextLabel};
pub use capture::{
    default_backend, video_inputs, CaptureBackend, CaptureEvent, DeviceDescriptor, DeviceKind,
    MockCaptureBackend, MockDevice, MockFailure, StreamHandle,
};
#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub use capture::V4l2CaptureBackend;
pub use error::{MediaError, MediaResult};
pub use overlay::{
    paint_detections, OverlayStyle, OverlaySurface, Rgba, StrokeStyle, SurfaceProvider,
    SurfaceSize,
};
