//! Mock capture backend for tests, demos and hosts without cameras
//!
//! Devices, failures and latencies are scripted up front. The backend keeps
//! count of open streams so callers can check that every stream is released.

use super::{CaptureBackend, CaptureEvent, DeviceDescriptor, DeviceKind, StreamHandle};
use crate::error::MediaError;
use async_trait::async_trait;
use camwall_core::DeviceId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Scripted behaviour of one mock device
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub descriptor: DeviceDescriptor,
    /// Delay before the stream request completes
    pub bind_delay: Duration,
    /// Error returned instead of a stream
    pub failure: Option<MockFailure>,
}

/// Failure a mock device reports on acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    PermissionDenied,
    Busy,
}

impl MockDevice {
    pub fn camera(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            descriptor: DeviceDescriptor::video(id.clone(), format!("Mock Camera {}", id)),
            bind_delay: Duration::ZERO,
            failure: None,
        }
    }

    pub fn microphone(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            descriptor: DeviceDescriptor {
                id: DeviceId::new(id.clone()),
                label: format!("Mock Microphone {}", id),
                kind: DeviceKind::AudioInput,
            },
            bind_delay: Duration::ZERO,
            failure: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.bind_delay = delay;
        self
    }

    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    devices: Vec<MockDevice>,
    deny_enumeration: bool,
    max_open_streams: Option<usize>,
    open: HashMap<u64, (DeviceId, Arc<AtomicBool>)>,
    acquired_total: usize,
    released_total: usize,
}

/// Scripted [`CaptureBackend`]
#[derive(Debug, Clone)]
pub struct MockCaptureBackend {
    state: Arc<RwLock<MockState>>,
    event_tx: broadcast::Sender<CaptureEvent>,
}

impl Default for MockCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCaptureBackend {
    /// Backend with a single camera
    pub fn new() -> Self {
        Self::with_devices(vec![MockDevice::camera("mock_camera_0")])
    }

    /// Backend with `count` working cameras `mock_camera_0..`
    pub fn with_cameras(count: usize) -> Self {
        Self::with_devices(
            (0..count)
                .map(|i| MockDevice::camera(format!("mock_camera_{}", i)))
                .collect(),
        )
    }

    pub fn with_devices(devices: Vec<MockDevice>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(MockState {
                devices,
                ..MockState::default()
            })),
            event_tx,
        }
    }

    /// Make enumeration fail as if permission were denied
    pub fn deny_enumeration(&self, deny: bool) {
        self.state.write().deny_enumeration = deny;
    }

    /// Cap simultaneously open streams, like a platform handle limit
    pub fn set_max_open_streams(&self, limit: Option<usize>) {
        self.state.write().max_open_streams = limit;
    }

    /// Replace the device list (hot-plug)
    pub fn set_devices(&self, devices: Vec<MockDevice>) {
        self.state.write().devices = devices;
    }

    /// Unplug a device: every open stream on it ends and subscribers are told
    pub fn disconnect(&self, device_id: &DeviceId) {
        let ended: Vec<u64> = {
            let mut state = self.state.write();
            state.devices.retain(|d| &d.descriptor.id != device_id);
            state
                .open
                .iter()
                .filter(|(_, (dev, _))| dev == device_id)
                .map(|(id, (_, live))| {
                    live.store(false, Ordering::Release);
                    *id
                })
                .collect()
        };

        info!("Mock device {} disconnected", device_id);
        let _ = self.event_tx.send(CaptureEvent::DeviceDisconnected {
            device_id: device_id.clone(),
        });
        for stream_id in ended {
            let _ = self.event_tx.send(CaptureEvent::StreamEnded {
                device_id: device_id.clone(),
                stream_id,
            });
        }
    }

    /// Streams currently held by callers
    pub fn open_streams(&self) -> usize {
        self.state.read().open.len()
    }

    /// Streams handed out since creation
    pub fn acquired_total(&self) -> usize {
        self.state.read().acquired_total
    }

    /// Streams returned since creation
    pub fn released_total(&self) -> usize {
        self.state.read().released_total
    }
}

#[async_trait]
impl CaptureBackend for MockCaptureBackend {
    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, MediaError> {
        let state = self.state.read();
        if state.deny_enumeration {
            return Err(MediaError::PermissionDenied {
                operation: "enumerate_devices".to_string(),
            });
        }
        Ok(state.devices.iter().map(|d| d.descriptor.clone()).collect())
    }

    async fn acquire_stream(&self, device_id: &DeviceId) -> Result<StreamHandle, MediaError> {
        let device = self
            .state
            .read()
            .devices
            .iter()
            .find(|d| &d.descriptor.id == device_id)
            .cloned()
            .ok_or_else(|| MediaError::DeviceNotFound {
                device_id: device_id.to_string(),
            })?;

        if !device.bind_delay.is_zero() {
            tokio::time::sleep(device.bind_delay).await;
        }

        match device.failure {
            Some(MockFailure::PermissionDenied) => {
                return Err(MediaError::PermissionDenied {
                    operation: format!("acquire_stream({})", device_id),
                })
            }
            Some(MockFailure::Busy) => {
                return Err(MediaError::DeviceBusy {
                    device_id: device_id.to_string(),
                })
            }
            None => {}
        }

        let mut state = self.state.write();
        if let Some(limit) = state.max_open_streams {
            if state.open.len() >= limit {
                return Err(MediaError::ResourceNotAvailable {
                    resource: format!("device handles (limit {})", limit),
                });
            }
        }

        let stream = StreamHandle::new(device_id.clone());
        state
            .open
            .insert(stream.id(), (device_id.clone(), stream.liveness()));
        state.acquired_total += 1;
        debug!("Mock stream {} opened on {}", stream.id(), device_id);
        Ok(stream)
    }

    async fn release_stream(&self, stream: StreamHandle) -> Result<(), MediaError> {
        let mut state = self.state.write();
        if state.open.remove(&stream.id()).is_none() {
            return Err(MediaError::InvalidState {
                message: format!("stream {} is not open", stream.id()),
            });
        }
        state.released_total += 1;
        debug!("Mock stream {} released", stream.id());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<CaptureEvent>> {
        Some(self.event_tx.subscribe())
    }
}
