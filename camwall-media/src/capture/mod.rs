//! Capture device enumeration and stream acquisition
//!
//! The host environment owns the cameras. A [`CaptureBackend`] is the seam
//! through which the grid asks it for device descriptors and live streams.

pub mod mock;
#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub mod v4l2;

use crate::error::MediaError;
use async_trait::async_trait;
use camwall_core::DeviceId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

pub use mock::{MockCaptureBackend, MockDevice, MockFailure};
#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub use v4l2::V4l2CaptureBackend;

/// Kind discriminator of an enumerated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Camera or other video source
    VideoInput,
    /// Microphone
    AudioInput,
    /// Speaker
    AudioOutput,
}

/// Device information as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: DeviceId,
    pub label: String,
    pub kind: DeviceKind,
}

impl DeviceDescriptor {
    pub fn video(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: DeviceId::new(id),
            label: label.into(),
            kind: DeviceKind::VideoInput,
        }
    }

    pub fn is_video_input(&self) -> bool {
        self.kind == DeviceKind::VideoInput
    }
}

/// Keep only video inputs, preserving enumeration order
pub fn video_inputs(devices: Vec<DeviceDescriptor>) -> Vec<DeviceDescriptor> {
    devices.into_iter().filter(|d| d.is_video_input()).collect()
}

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// Live stream acquired from a device
///
/// Streams are returned to the backend with [`CaptureBackend::release_stream`].
#[derive(Debug)]
pub struct StreamHandle {
    id: u64,
    device_id: DeviceId,
    live: Arc<AtomicBool>,
}

impl StreamHandle {
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            id: NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed),
            device_id,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// False once the host reported the stream as ended
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Shared flag the backend clears when the stream terminates
    pub(crate) fn liveness(&self) -> Arc<AtomicBool> {
        self.live.clone()
    }
}

/// Capture events observed from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    DeviceConnected { device_id: DeviceId },
    DeviceDisconnected { device_id: DeviceId },
    StreamEnded { device_id: DeviceId, stream_id: u64 },
}

/// Host capability for camera discovery and stream acquisition
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// All devices the host exposes, in host order
    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, MediaError>;

    /// Open a live stream on `device_id`
    async fn acquire_stream(&self, device_id: &DeviceId) -> Result<StreamHandle, MediaError>;

    /// Return a stream to the host
    async fn release_stream(&self, stream: StreamHandle) -> Result<(), MediaError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Device/stream events, if the backend observes any
    fn subscribe(&self) -> Option<broadcast::Receiver<CaptureEvent>> {
        None
    }
}

/// Get the appropriate platform capture backend
pub fn default_backend() -> Arc<dyn CaptureBackend> {
    #[cfg(all(target_os = "linux", feature = "v4l2"))]
    {
        Arc::new(V4l2CaptureBackend::new())
    }
    #[cfg(not(all(target_os = "linux", feature = "v4l2")))]
    {
        Arc::new(MockCaptureBackend::new())
    }
}
