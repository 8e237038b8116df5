//! Grid Demo - Camera Wall Against In-Memory Hosts
//!
//! Builds a 21-slot wall over three mock cameras (one of them busy), moves
//! the highlight, paints a detection cycle and focuses a camera, printing
//! what the host would see.

use camwall::{
    CctvId, DeviceId, GridController, GridEvent, MockCaptureBackend, MockDevice, MockFailure, MockRemoteApi,
    RecordingNavigator, RecordingNotifier, SoftwareCanvasProvider, SurfaceSize,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    camwall::logging::init_logging()?;

    println!("📺 camwall grid demo");
    println!("====================");

    let capture = MockCaptureBackend::with_devices(vec![
        MockDevice::camera("entrance").with_delay(Duration::from_millis(40)),
        MockDevice::camera("parking").failing(MockFailure::Busy),
        MockDevice::microphone("intercom"),
        MockDevice::camera("warehouse"),
    ]);
    let remote = MockRemoteApi::new();
    let navigator = RecordingNavigator::new();
    let notifier = RecordingNotifier::new();
    let canvases = SoftwareCanvasProvider::new(SurfaceSize::new(320, 240));

    let mut grid = GridController::builder()
        .capture_backend(Arc::new(capture.clone()))
        .remote(Arc::new(remote.clone()))
        .navigator(Arc::new(navigator.clone()))
        .notifier(Arc::new(notifier.clone()))
        .surface_provider(Arc::new(canvases.clone()))
        .build()?;
    let mut events = grid.events();

    let report = grid.initialize_default().await?;
    println!(
        "🧱 {} slots: {} bound, {} empty ({} failed)",
        report.slots, report.bound, report.empty, report.failed
    );
    for slot in grid.slots().iter().take(4) {
        println!(
            "  {} -> {:?} [{:?}]",
            slot.cctv_id(),
            slot.device_id().map(|d| d.as_str()),
            slot.state()
        );
    }

    grid.highlight(0)?;
    grid.highlight(2)?;
    println!("🔦 Highlighted slot {:?}", grid.selection().highlighted_index);

    let feed = r#"[
        {"cctv_id": "CCTV1", "detections": [
            {"x1": 40, "y1": 60, "x2": 120, "y2": 200, "class_id": 0},
            {"x1": 150, "y1": 80, "x2": 260, "y2": 180, "class_id": 2}
        ]},
        {"cctv_id": "CCTV42", "detections": []}
    ]"#;
    let overlay = grid.render_overlay_json(feed)?;
    println!(
        "🟥 Overlay rendered on {:?}, skipped {:?}",
        overlay.rendered, overlay.skipped
    );
    if let Some(canvas) = canvases.canvas(&"CCTV1".parse::<CctvId>()?) {
        let snapshot = canvas.snapshot();
        println!(
            "  CCTV1 canvas: {} painted pixels, labels {:?}",
            snapshot.painted_pixels(),
            snapshot.labels().iter().map(|l| &l.text).collect::<Vec<_>>()
        );
    }

    remote.reject_next_access("CCTV not found");
    if let Err(e) = grid.focus(1).await {
        println!("🚫 Focus refused: {}", e);
    }
    let outcome = grid.focus(2).await?;
    println!("🎯 Navigated to {}", outcome.path);

    grid.start_detection().await?;

    capture.disconnect(&DeviceId::new("warehouse"));
    println!("🔌 Slots emptied by disconnect: {}", grid.drain_capture_events().await);

    grid.teardown().await;

    println!("\n📨 Notifications:");
    for notification in notifier.notifications() {
        println!("  {:?}: {}", notification.level, notification.message);
    }
    println!("🧭 Navigation: {:?}", navigator.paths());

    let mut counts = std::collections::BTreeMap::new();
    while let Ok(event) = events.try_recv() {
        *counts.entry(event.event_type()).or_insert(0) += 1;
        if let GridEvent::Error { code, .. } = event {
            println!("  error event {}", code);
        }
    }
    println!("📊 Events: {:?}", counts);

    Ok(())
}
