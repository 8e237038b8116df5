//! V4L2-based capture devices for Linux
//!
//! Devices are the `/dev/video*` nodes that advertise video capture. The node
//! path doubles as the device id. An acquired stream keeps the node open.

use super::{CaptureBackend, DeviceDescriptor, DeviceKind, StreamHandle};
use crate::error::MediaError;
use async_trait::async_trait;
use camwall_core::DeviceId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use v4l::capability::Flags;
use v4l::Device;

/// V4L2-based capture backend
pub struct V4l2CaptureBackend {
    open: Arc<Mutex<HashMap<u64, Device>>>,
}

impl V4l2CaptureBackend {
    pub fn new() -> Self {
        Self {
            open: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for V4l2CaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn scan_nodes() -> Vec<DeviceDescriptor> {
    let mut nodes = v4l::context::enum_devices();
    nodes.sort_by_key(|node| node.index());

    nodes
        .into_iter()
        .filter_map(|node| {
            let path = node.path().to_string_lossy().into_owned();
            // Metadata nodes share the driver with the capture node; skip them.
            let caps = match Device::with_path(node.path()).and_then(|dev| dev.query_caps()) {
                Ok(caps) => caps,
                Err(e) => {
                    debug!("Skipping {}: {}", path, e);
                    return None;
                }
            };
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                return None;
            }
            let label = node.name().unwrap_or_else(|| caps.card.clone());
            Some(DeviceDescriptor {
                id: DeviceId::new(path),
                label,
                kind: DeviceKind::VideoInput,
            })
        })
        .collect()
}

#[async_trait]
impl CaptureBackend for V4l2CaptureBackend {
    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, MediaError> {
        let devices = tokio::task::spawn_blocking(scan_nodes)
            .await
            .map_err(|e| MediaError::DeviceEnumerationFailed {
                reason: e.to_string(),
            })?;
        info!("V4L2 enumeration found {} capture devices", devices.len());
        Ok(devices)
    }

    async fn acquire_stream(&self, device_id: &DeviceId) -> Result<StreamHandle, MediaError> {
        let path = device_id.to_string();
        let device = tokio::task::spawn_blocking(move || Device::with_path(path))
            .await
            .map_err(|e| MediaError::InvalidState {
                message: e.to_string(),
            })?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => MediaError::PermissionDenied {
                    operation: format!("open {}", device_id),
                },
                std::io::ErrorKind::NotFound => MediaError::DeviceNotFound {
                    device_id: device_id.to_string(),
                },
                _ => MediaError::Io { source: e },
            })?;

        let stream = StreamHandle::new(device_id.clone());
        self.open.lock().insert(stream.id(), device);
        debug!("V4L2 stream {} opened on {}", stream.id(), device_id);
        Ok(stream)
    }

    async fn release_stream(&self, stream: StreamHandle) -> Result<(), MediaError> {
        match self.open.lock().remove(&stream.id()) {
            Some(_device) => Ok(()),
            None => {
                warn!("V4L2 stream {} was not open", stream.id());
                Err(MediaError::InvalidState {
                    message: format!("stream {} is not open", stream.id()),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "v4l2"
    }
}
