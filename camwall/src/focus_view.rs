//! Single-camera view
//!
//! The page a focused camera navigates to shows one feed. Camera `CCTV{n}`
//! maps to the n-th video input in host enumeration order.

use crate::host::{Notification, Notifier};
use camwall_core::{CamwallError, CamwallResult, CctvId};
use camwall_media::{video_inputs, CaptureBackend, DeviceDescriptor, StreamHandle};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One camera shown on its own
pub struct FocusView {
    capture: Arc<dyn CaptureBackend>,
    notifier: Arc<dyn Notifier>,
    current: Option<(CctvId, DeviceDescriptor, StreamHandle)>,
}

impl std::fmt::Debug for FocusView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusView")
            .field("capture", &self.capture.name())
            .field("cctv_id", &self.cctv_id())
            .finish()
    }
}

impl FocusView {
    /// Create a closed view
    pub fn new(capture: Arc<dyn CaptureBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            capture,
            notifier,
            current: None,
        }
    }

    /// Bind the device of `cctv_id` to the view, replacing any open stream
    pub async fn open(&mut self, cctv_id: &CctvId) -> CamwallResult<DeviceDescriptor> {
        self.close().await;

        let devices = match self.capture.enumerate_devices().await {
            Ok(devices) => video_inputs(devices),
            Err(e) => return Err(self.fail(e.into_enumeration_error())),
        };

        let Some(device) = devices.into_iter().nth(cctv_id.device_index()) else {
            return Err(self.fail(CamwallError::DeviceNotFound {
                cctv_id: cctv_id.to_string(),
            }));
        };

        let stream = match self.capture.acquire_stream(&device.id).await {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail(e.into_bind_error(cctv_id, &device.id))),
        };

        info!("Focus view showing {} on {} ({})", cctv_id, device.id, device.label);
        self.current = Some((cctv_id.clone(), device.clone(), stream));
        Ok(device)
    }

    /// Release the stream, if any
    pub async fn close(&mut self) {
        if let Some((cctv_id, _, stream)) = self.current.take() {
            debug!("Closing focus view of {}", cctv_id);
            if let Err(e) = self.capture.release_stream(stream).await {
                warn!("Failed to release stream of {}: {}", cctv_id, e);
            }
        }
    }

    /// Camera currently shown
    pub fn cctv_id(&self) -> Option<&CctvId> {
        self.current.as_ref().map(|(id, _, _)| id)
    }

    /// Device currently shown
    pub fn device(&self) -> Option<&DeviceDescriptor> {
        self.current.as_ref().map(|(_, device, _)| device)
    }

    /// Whether a stream is bound and still live
    pub fn is_live(&self) -> bool {
        self.current
            .as_ref()
            .map(|(_, _, stream)| stream.is_live())
            .unwrap_or(false)
    }

    fn fail(&self, err: CamwallError) -> CamwallError {
        warn!("{} [{}]", err, err.error_code());
        self.notifier.notify(Notification::error(err.to_string()));
        err
    }
}
