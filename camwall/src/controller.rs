//! Camera grid controller
//!
//! Owns the slot table, the slot → overlay surface map and the live streams
//! of one grid. All mutation goes through `&mut self`; the only concurrency is
//! the set of per-slot stream acquisitions awaited together in
//! [`GridController::initialize`].

use crate::config::GridConfig;
use crate::event::GridEvent;
use crate::host::{LogNavigator, LogNotifier, Navigator, Notification, Notifier};
use camwall_core::{
    parse_detection_feed, CameraSlot, CamwallError, CamwallResult, CctvId, DetectionOverlayResult,
    DeviceId, SelectionState, SlotState, SlotTable,
};
use camwall_media::{
    default_backend, paint_detections, video_inputs, CaptureBackend, CaptureEvent, MediaError,
    OverlaySurface, SoftwareCanvasProvider, StreamHandle, SurfaceProvider,
};
use camwall_remote::{focus_view_path, HttpRemoteApi, LastAccessRecord, RemoteApi};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Outcome of [`GridController::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridReport {
    /// Slots created
    pub slots: usize,
    /// Slots holding a live stream
    pub bound: usize,
    /// Slots showing the placeholder
    pub empty: usize,
    /// Bind attempts that failed
    pub failed: usize,
}

/// Outcome of a successful [`GridController::focus`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusOutcome {
    /// Focused camera
    pub cctv_id: CctvId,
    /// Path the host navigated to
    pub path: String,
    /// Last access confirmed by the backend
    pub record: LastAccessRecord,
}

/// Outcome of [`GridController::render_overlay`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Cameras whose overlay was repainted, in input order
    pub rendered: Vec<CctvId>,
    /// Result ids without a surface, in input order
    pub skipped: Vec<String>,
}

/// Fluent builder for [`GridController`]
pub struct GridControllerBuilder {
    config: GridConfig,
    capture: Option<Arc<dyn CaptureBackend>>,
    remote: Option<Arc<dyn RemoteApi>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
    surfaces: Option<Arc<dyn SurfaceProvider>>,
}

impl GridControllerBuilder {
    fn new() -> Self {
        Self {
            config: GridConfig::default(),
            capture: None,
            remote: None,
            navigator: None,
            notifier: None,
            surfaces: None,
        }
    }

    /// Replace the configuration
    pub fn config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Capture backend (defaults to the platform backend)
    pub fn capture_backend(mut self, capture: Arc<dyn CaptureBackend>) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Remote API (defaults to HTTP against `config.remote`)
    pub fn remote(mut self, remote: Arc<dyn RemoteApi>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Navigation target for focus
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Sink for user-visible notifications
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Factory for per-slot overlay surfaces (defaults to software canvases)
    pub fn surface_provider(mut self, surfaces: Arc<dyn SurfaceProvider>) -> Self {
        self.surfaces = Some(surfaces);
        self
    }

    /// Validate the configuration and build the controller
    pub fn build(self) -> CamwallResult<GridController> {
        self.config.validate()?;

        let remote: Arc<dyn RemoteApi> = match self.remote {
            Some(remote) => remote,
            None => Arc::new(HttpRemoteApi::new(self.config.remote.clone())?),
        };
        let capture = self.capture.unwrap_or_else(default_backend);
        let surfaces = self
            .surfaces
            .unwrap_or_else(|| Arc::new(SoftwareCanvasProvider::new(self.config.surface_size)));
        let (event_tx, _) = broadcast::channel(self.config.event_capacity);

        info!("Grid controller using capture backend {}", capture.name());
        Ok(GridController {
            config: self.config,
            capture,
            remote,
            navigator: self.navigator.unwrap_or_else(|| Arc::new(LogNavigator)),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
            surface_provider: surfaces,
            table: SlotTable::new(0),
            surfaces: HashMap::new(),
            streams: HashMap::new(),
            capture_events: None,
            event_tx,
        })
    }
}

/// Binds capture devices to grid slots and drives selection and overlays
pub struct GridController {
    config: GridConfig,
    capture: Arc<dyn CaptureBackend>,
    remote: Arc<dyn RemoteApi>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    surface_provider: Arc<dyn SurfaceProvider>,
    table: SlotTable,
    surfaces: HashMap<CctvId, Box<dyn OverlaySurface>>,
    streams: HashMap<usize, StreamHandle>,
    capture_events: Option<broadcast::Receiver<CaptureEvent>>,
    event_tx: broadcast::Sender<GridEvent>,
}

impl std::fmt::Debug for GridController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("capture", &self.capture.name())
            .field("slots", &self.table.len())
            .field("streams", &self.streams.len())
            .field("selection", self.table.selection())
            .finish()
    }
}

impl GridController {
    /// Start building a controller
    pub fn builder() -> GridControllerBuilder {
        GridControllerBuilder::new()
    }

    /// Build the grid with `config.max_slots` slots
    pub async fn initialize_default(&mut self) -> CamwallResult<GridReport> {
        self.initialize(self.config.max_slots).await
    }

    /// Build a grid of `max_slots` slots and bind the first devices to them.
    ///
    /// Streams and surfaces from a previous grid are released first. If the
    /// host refuses device enumeration every slot is left empty and the error
    /// is returned after it has been notified; per-slot bind failures only
    /// empty that slot.
    ///
    /// Acquisitions are awaited and applied while `&mut self` is held, so no
    /// slot can be removed under an in-flight bind. Dropping the returned
    /// future cancels the outstanding acquisitions with it.
    pub async fn initialize(&mut self, max_slots: usize) -> CamwallResult<GridReport> {
        self.release_all().await;
        self.release_surfaces();

        self.table = SlotTable::new(max_slots);
        self.surfaces = self
            .table
            .cctv_ids()
            .into_iter()
            .map(|id| {
                let surface = self.surface_provider.create_surface(&id);
                (id, surface)
            })
            .collect();
        self.capture_events = self.capture.subscribe();

        let devices = match self.capture.enumerate_devices().await {
            Ok(devices) => video_inputs(devices),
            Err(e) => {
                let err = self.fail(e.into_enumeration_error());
                self.empty_unbound_slots();
                return Err(err);
            }
        };
        info!(
            "Initializing grid: {} slots, {} video devices",
            max_slots,
            devices.len()
        );

        let mut pending = FuturesUnordered::new();
        for (index, device) in devices.into_iter().take(max_slots).enumerate() {
            let slot = self.table.get_mut(index)?;
            if !slot.begin_binding(device.id.clone()) {
                continue;
            }
            let capture = Arc::clone(&self.capture);
            pending.push(async move {
                let result = capture.acquire_stream(&device.id).await;
                (index, device.id, result)
            });
        }

        let mut failed = 0;
        while let Some((index, device_id, result)) = pending.next().await {
            if !self.apply_binding(index, device_id, result) {
                failed += 1;
            }
        }
        self.empty_unbound_slots();

        let report = GridReport {
            slots: self.table.len(),
            bound: self.table.count_in(SlotState::Bound),
            empty: self.table.count_in(SlotState::Empty),
            failed,
        };
        info!(
            "Grid ready: {} bound, {} empty, {} failed",
            report.bound, report.empty, report.failed
        );
        Ok(report)
    }

    /// Apply one finished acquisition to its slot; `false` if the bind failed.
    ///
    /// No await point sits between an acquisition completing and this call,
    /// so a handed-out stream always lands in `self.streams`.
    fn apply_binding(
        &mut self,
        index: usize,
        device_id: DeviceId,
        result: Result<StreamHandle, MediaError>,
    ) -> bool {
        let cctv_id = CctvId::from_slot_index(index);
        match result {
            Ok(stream) => {
                if let Ok(slot) = self.table.get_mut(index) {
                    slot.mark_bound();
                }
                debug!("{} bound to {} (stream {})", cctv_id, device_id, stream.id());
                self.streams.insert(index, stream);
                self.emit(GridEvent::SlotBound {
                    index,
                    cctv_id,
                    device_id,
                });
                true
            }
            Err(e) => {
                let err = e.into_bind_error(&cctv_id, &device_id);
                self.fail(err);
                if let Ok(slot) = self.table.get_mut(index) {
                    slot.mark_empty();
                }
                self.emit(GridEvent::SlotEmpty { index, cctv_id });
                false
            }
        }
    }

    fn empty_unbound_slots(&mut self) {
        let unbound: Vec<usize> = self
            .table
            .slots()
            .iter()
            .filter(|slot| slot.state() == SlotState::Unbound)
            .map(CameraSlot::index)
            .collect();
        for index in unbound {
            if let Ok(slot) = self.table.get_mut(index) {
                slot.mark_empty();
                let cctv_id = slot.cctv_id().clone();
                self.emit(GridEvent::SlotEmpty { index, cctv_id });
            }
        }
    }

    /// Highlight slot `index`, clearing every other highlight
    pub fn highlight(&mut self, index: usize) -> CamwallResult<()> {
        if let Err(e) = self.table.highlight(index) {
            return Err(self.fail(e));
        }
        debug!("Highlighted slot {}", index);
        self.emit(GridEvent::Highlighted { index });
        Ok(())
    }

    /// Record the last access of slot `index` and open its focus view.
    ///
    /// Navigation happens only after the backend confirmed the record; any
    /// failure is notified and leaves selection untouched.
    pub async fn focus(&mut self, index: usize) -> CamwallResult<FocusOutcome> {
        let cctv_id = match self.table.cctv_id_at(index) {
            Ok(id) => id,
            Err(e) => return Err(self.fail(e)),
        };

        let record = match self.remote.record_last_access(&cctv_id).await {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };

        let path = focus_view_path(&cctv_id);
        info!("Focusing {} (last access {:?})", cctv_id, record.last_access);
        self.navigator.navigate(&path);
        self.table.set_focused(cctv_id.clone());
        self.emit(GridEvent::Focused {
            cctv_id: cctv_id.clone(),
            path: path.clone(),
        });
        Ok(FocusOutcome {
            cctv_id,
            path,
            record,
        })
    }

    /// Repaint the overlay of every camera named in `results`.
    ///
    /// Results for cameras without a surface are logged and skipped.
    pub fn render_overlay(&mut self, results: &[DetectionOverlayResult]) -> OverlayReport {
        let mut report = OverlayReport::default();
        for result in results {
            let target = result
                .cctv_id
                .parse::<CctvId>()
                .ok()
                .filter(|id| self.surfaces.contains_key(id));
            let Some(cctv_id) = target else {
                self.fail(CamwallError::UnknownOverlayTarget {
                    cctv_id: result.cctv_id.clone(),
                });
                report.skipped.push(result.cctv_id.clone());
                continue;
            };

            if let Some(surface) = self.surfaces.get_mut(&cctv_id) {
                paint_detections(surface.as_mut(), &result.detections, &self.config.overlay);
            }
            self.emit(GridEvent::OverlayRendered {
                cctv_id: cctv_id.clone(),
                detections: result.detections.len(),
            });
            report.rendered.push(cctv_id);
        }
        debug!(
            "Overlay cycle: {} rendered, {} skipped",
            report.rendered.len(),
            report.skipped.len()
        );
        report
    }

    /// Parse a JSON detection feed and render it
    pub fn render_overlay_json(&mut self, payload: &str) -> CamwallResult<OverlayReport> {
        match parse_detection_feed(payload) {
            Ok(results) => Ok(self.render_overlay(&results)),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Ask the backend to start the detection job
    pub async fn start_detection(&mut self) -> CamwallResult<()> {
        if let Err(e) = self.remote.start_detection().await {
            return Err(self.fail(e));
        }
        self.notifier
            .notify(Notification::info("Object detection started"));
        self.emit(GridEvent::DetectionStarted);
        Ok(())
    }

    /// Show only the slot of `cctv_id`
    pub fn show_only(&mut self, cctv_id: &CctvId) -> CamwallResult<()> {
        if let Err(e) = self.table.show_only(cctv_id) {
            return Err(self.fail(e));
        }
        debug!("Showing only {}", cctv_id);
        Ok(())
    }

    /// Make every slot visible again
    pub fn show_all(&mut self) {
        self.table.show_all();
    }

    /// Camera ids of the grid in slot order
    pub fn cctv_ids(&self) -> Vec<CctvId> {
        self.table.cctv_ids()
    }

    /// React to the stream on `device_id` ending.
    ///
    /// The slot goes `Bound → Empty` and its handle is returned to the
    /// backend. Returns `true` if a bound slot was emptied.
    pub async fn handle_stream_ended(&mut self, device_id: &DeviceId) -> bool {
        let Some(index) = self.table.index_of_device(device_id) else {
            debug!("Stream end for unknown device {}", device_id);
            return false;
        };
        let Ok(slot) = self.table.get_mut(index) else {
            return false;
        };
        if slot.state() != SlotState::Bound || !slot.mark_empty() {
            return false;
        }
        let cctv_id = slot.cctv_id().clone();
        warn!("Stream for {} ended (device {})", cctv_id, device_id);

        if let Some(stream) = self.streams.remove(&index) {
            // The host may already have dropped an ended stream.
            if let Err(e) = self.capture.release_stream(stream).await {
                debug!("Release of ended stream on {} failed: {}", device_id, e);
            }
        }
        self.emit(GridEvent::SlotEmpty { index, cctv_id });
        true
    }

    /// Apply pending capture events; returns how many slots were emptied
    pub async fn drain_capture_events(&mut self) -> usize {
        let mut ended = Vec::new();
        if let Some(rx) = self.capture_events.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(CaptureEvent::StreamEnded { device_id, .. })
                    | Ok(CaptureEvent::DeviceDisconnected { device_id }) => ended.push(device_id),
                    Ok(CaptureEvent::DeviceConnected { device_id }) => {
                        debug!("Device {} connected", device_id);
                    }
                    Err(broadcast::error::TryRecvError::Lagged(n)) => {
                        warn!("Missed {} capture events", n);
                    }
                    Err(_) => break,
                }
            }
        }

        let mut emptied = 0;
        for device_id in &ended {
            if self.handle_stream_ended(device_id).await {
                emptied += 1;
            }
        }
        emptied
    }

    /// Release every stream and drop slots, surfaces and selection
    pub async fn teardown(&mut self) {
        self.release_all().await;
        self.release_surfaces();
        self.table.clear();
        self.capture_events = None;
        info!("Grid torn down");
    }

    fn release_surfaces(&mut self) {
        for (cctv_id, _) in self.surfaces.drain() {
            self.surface_provider.release_surface(&cctv_id);
        }
    }

    async fn release_all(&mut self) {
        let streams: Vec<(usize, StreamHandle)> = self.streams.drain().collect();
        if streams.is_empty() {
            return;
        }
        debug!("Releasing {} streams", streams.len());
        for (index, stream) in streams {
            if let Err(e) = self.capture.release_stream(stream).await {
                warn!("Failed to release stream of slot {}: {}", index, e);
            }
        }
    }

    /// Subscribe to grid events
    pub fn events(&self) -> broadcast::Receiver<GridEvent> {
        self.event_tx.subscribe()
    }

    /// All slots in index order
    pub fn slots(&self) -> &[CameraSlot] {
        self.table.slots()
    }

    /// Slot at `index`
    pub fn slot(&self, index: usize) -> CamwallResult<&CameraSlot> {
        self.table.get(index)
    }

    /// Current highlight and focus
    pub fn selection(&self) -> &SelectionState {
        self.table.selection()
    }

    /// Active configuration
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of live streams held by the grid
    pub fn live_streams(&self) -> usize {
        self.streams.len()
    }

    /// Log, notify and publish `err`, handing it back to the caller
    fn fail(&self, err: CamwallError) -> CamwallError {
        warn!("{} [{}]", err, err.error_code());
        if err.is_user_visible() {
            self.notifier.notify(Notification::error(err.to_string()));
        }
        self.emit(GridEvent::from(&err));
        err
    }

    fn emit(&self, event: GridEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}
