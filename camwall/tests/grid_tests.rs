//! Integration tests for the grid controller
//!
//! Every host capability is mocked: cameras come from the mock capture
//! backend, the web backend from the scripted remote, and navigation and
//! notifications are recorded.

use camwall::*;
use camwall_media::MediaError;
use camwall_remote::RemoteCall;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    grid: GridController,
    capture: MockCaptureBackend,
    remote: MockRemoteApi,
    navigator: RecordingNavigator,
    notifier: RecordingNotifier,
    canvases: SoftwareCanvasProvider,
}

fn harness_with(capture: MockCaptureBackend) -> Harness {
    let remote = MockRemoteApi::new();
    let navigator = RecordingNavigator::new();
    let notifier = RecordingNotifier::new();
    let canvases = SoftwareCanvasProvider::new(SurfaceSize::new(120, 90));
    let grid = GridController::builder()
        .capture_backend(Arc::new(capture.clone()))
        .remote(Arc::new(remote.clone()))
        .navigator(Arc::new(navigator.clone()))
        .notifier(Arc::new(notifier.clone()))
        .surface_provider(Arc::new(canvases.clone()))
        .build()
        .unwrap();
    Harness {
        grid,
        capture,
        remote,
        navigator,
        notifier,
        canvases,
    }
}

fn harness(cameras: usize) -> Harness {
    harness_with(MockCaptureBackend::with_cameras(cameras))
}

fn detection(x1: f32, y1: f32, x2: f32, y2: f32, class_id: u32) -> Detection {
    Detection {
        bounding_box: BoundingBox::new(x1, y1, x2, y2),
        class_id,
    }
}

// ============================================================================
// INITIALIZATION
// ============================================================================

#[tokio::test]
async fn test_initialize_21_slots_with_3_devices() {
    let mut h = harness(3);
    let report = h.grid.initialize(21).await.unwrap();

    assert_eq!(report.slots, 21);
    assert_eq!(report.bound, 3);
    assert_eq!(report.empty, 18);
    assert_eq!(report.failed, 0);

    for slot in &h.grid.slots()[..3] {
        assert_eq!(slot.state(), SlotState::Bound);
    }
    for slot in &h.grid.slots()[3..] {
        assert_eq!(slot.state(), SlotState::Empty);
        assert!(slot.device_id().is_none());
    }
    assert_eq!(h.grid.slots()[20].cctv_id().as_str(), "CCTV21");
    assert_eq!(h.capture.open_streams(), 3);
}

#[tokio::test]
async fn test_slot_counts_for_any_ratio() {
    for (slots, devices) in [(0, 0), (0, 3), (4, 0), (4, 4), (4, 9), (7, 2)] {
        let mut h = harness(devices);
        let report = h.grid.initialize(slots).await.unwrap();
        assert_eq!(h.grid.slots().len(), slots, "N={slots} D={devices}");
        assert_eq!(report.bound, slots.min(devices), "N={slots} D={devices}");
        assert_eq!(report.empty, slots - slots.min(devices), "N={slots} D={devices}");
    }
}

#[tokio::test]
async fn test_audio_devices_are_ignored() {
    let mut h = harness_with(MockCaptureBackend::with_devices(vec![
        MockDevice::microphone("mic"),
        MockDevice::camera("lobby"),
    ]));
    h.grid.initialize(2).await.unwrap();
    assert_eq!(
        h.grid.slot(0).unwrap().device_id().map(DeviceId::as_str),
        Some("lobby")
    );
    assert!(h.grid.slot(1).unwrap().is_empty());
}

#[tokio::test]
async fn test_bind_failure_is_scoped_to_its_slot() {
    let mut h = harness_with(MockCaptureBackend::with_devices(vec![
        MockDevice::camera("a"),
        MockDevice::camera("b").failing(MockFailure::Busy),
        MockDevice::camera("c"),
    ]));
    let report = h.grid.initialize(4).await.unwrap();

    assert_eq!(report.bound, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.empty, 2);
    assert!(h.grid.slot(0).unwrap().is_bound());
    assert!(h.grid.slot(1).unwrap().is_empty());
    assert!(h.grid.slot(2).unwrap().is_bound());

    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("CCTV2"));
}

#[tokio::test]
async fn test_bindings_applied_in_completion_order() {
    let mut h = harness_with(MockCaptureBackend::with_devices(vec![
        MockDevice::camera("slow").with_delay(Duration::from_millis(50)),
        MockDevice::camera("fast"),
    ]));
    let mut events = h.grid.events();
    h.grid.initialize(2).await.unwrap();

    let mut bound = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let GridEvent::SlotBound { index, .. } = event {
            bound.push(index);
        }
    }
    assert_eq!(bound, vec![1, 0]);
    assert_eq!(
        h.grid.slot(0).unwrap().device_id().map(DeviceId::as_str),
        Some("slow")
    );
}

#[tokio::test]
async fn test_enumeration_denied_falls_back_to_empty_grid() {
    let mut h = harness(3);
    h.capture.deny_enumeration(true);

    let err = h.grid.initialize(5).await.unwrap_err();
    assert!(matches!(err, CamwallError::DeviceEnumeration { .. }));
    assert_eq!(h.grid.slots().len(), 5);
    assert!(h.grid.slots().iter().all(CameraSlot::is_empty));
    assert_eq!(h.notifier.errors().len(), 1);

    // The grid stays interactive.
    h.grid.highlight(4).unwrap();
}

#[tokio::test]
async fn test_reinitialize_releases_previous_streams_first() {
    let mut h = harness(3);
    h.capture.set_max_open_streams(Some(3));

    h.grid.initialize(3).await.unwrap();
    assert_eq!(h.capture.open_streams(), 3);

    // Without releasing first the handle limit would be exceeded.
    let report = h.grid.initialize(3).await.unwrap();
    assert_eq!(report.bound, 3);
    assert_eq!(h.capture.open_streams(), 3);
    assert_eq!(h.capture.released_total(), 3);
}

// ============================================================================
// HIGHLIGHT / VISIBILITY
// ============================================================================

#[tokio::test]
async fn test_highlight_is_exclusive() {
    let mut h = harness(2);
    h.grid.initialize(6).await.unwrap();

    h.grid.highlight(1).unwrap();
    h.grid.highlight(4).unwrap();

    let highlighted: Vec<usize> = h
        .grid
        .slots()
        .iter()
        .filter(|s| s.is_highlighted())
        .map(CameraSlot::index)
        .collect();
    assert_eq!(highlighted, vec![4]);
    assert_eq!(h.grid.selection().highlighted_index, Some(4));
}

#[tokio::test]
async fn test_highlight_out_of_range_keeps_state() {
    let mut h = harness(1);
    h.grid.initialize(3).await.unwrap();
    h.grid.highlight(2).unwrap();

    let err = h.grid.highlight(3).unwrap_err();
    assert!(matches!(
        err,
        CamwallError::InvalidSlotIndex {
            index: 3,
            slot_count: 3
        }
    ));
    assert_eq!(h.grid.selection().highlighted_index, Some(2));
    assert!(h.grid.slot(2).unwrap().is_highlighted());
}

#[tokio::test]
async fn test_show_only_and_cctv_ids() {
    let mut h = harness(0);
    h.grid.initialize(3).await.unwrap();
    assert_eq!(
        h.grid.cctv_ids(),
        vec![
            CctvId::from_slot_index(0),
            CctvId::from_slot_index(1),
            CctvId::from_slot_index(2)
        ]
    );

    h.grid.show_only(&"CCTV2".parse().unwrap()).unwrap();
    let visible: Vec<bool> = h.grid.slots().iter().map(CameraSlot::is_visible).collect();
    assert_eq!(visible, vec![false, true, false]);

    let err = h.grid.show_only(&"CCTV9".parse().unwrap()).unwrap_err();
    assert!(matches!(err, CamwallError::UnknownCamera { .. }));

    h.grid.show_all();
    assert!(h.grid.slots().iter().all(CameraSlot::is_visible));
}

// ============================================================================
// FOCUS
// ============================================================================

#[tokio::test]
async fn test_focus_success_navigates() {
    let mut h = harness(2);
    h.grid.initialize(4).await.unwrap();

    let outcome = h.grid.focus(1).await.unwrap();
    assert_eq!(outcome.path, "/focus-webcam/CCTV2");
    assert_eq!(h.navigator.paths(), vec!["/focus-webcam/CCTV2".to_string()]);
    assert_eq!(
        h.grid.selection().focused_cctv_id,
        Some(CctvId::from_slot_index(1))
    );
    assert_eq!(
        h.remote.calls(),
        vec![RemoteCall::RecordLastAccess(CctvId::from_slot_index(1))]
    );
}

#[tokio::test]
async fn test_focus_rejected_does_not_navigate() {
    let mut h = harness(2);
    h.grid.initialize(4).await.unwrap();
    h.remote.reject_next_access("CCTV not found");

    let err = h.grid.focus(0).await.unwrap_err();
    assert!(matches!(
        err,
        CamwallError::RemoteCall {
            application_level: true,
            ..
        }
    ));
    assert!(h.navigator.paths().is_empty());
    assert!(h.grid.selection().focused_cctv_id.is_none());

    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("CCTV not found"));
}

#[tokio::test]
async fn test_focus_network_failure_does_not_navigate() {
    let mut h = harness(1);
    h.grid.initialize(2).await.unwrap();
    h.remote.fail_next_access("connection refused");

    assert!(h.grid.focus(0).await.is_err());
    assert!(h.navigator.last().is_none());
    assert_eq!(h.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_focus_unmapped_index() {
    let mut h = harness(1);
    h.grid.initialize(2).await.unwrap();

    let err = h.grid.focus(7).await.unwrap_err();
    assert!(matches!(err, CamwallError::InvalidSlotIndex { .. }));
    assert!(h.navigator.paths().is_empty());
    // No remote call for an index that maps to nothing.
    assert!(h.remote.calls().is_empty());
}

// ============================================================================
// OVERLAY
// ============================================================================

#[tokio::test]
async fn test_render_overlay_skips_unknown_camera() {
    let mut h = harness(0);
    h.grid.initialize(3).await.unwrap();

    let results = vec![
        DetectionOverlayResult {
            cctv_id: "CCTV1".to_string(),
            detections: vec![detection(10.0, 20.0, 30.0, 40.0, 0)],
        },
        DetectionOverlayResult {
            cctv_id: "CCTV99".to_string(),
            detections: vec![detection(1.0, 1.0, 2.0, 2.0, 5)],
        },
        DetectionOverlayResult {
            cctv_id: "CCTV3".to_string(),
            detections: vec![detection(50.0, 50.0, 70.0, 80.0, 2)],
        },
    ];
    let report = h.grid.render_overlay(&results);

    assert_eq!(
        report.rendered,
        vec![CctvId::from_slot_index(0), CctvId::from_slot_index(2)]
    );
    assert_eq!(report.skipped, vec!["CCTV99".to_string()]);

    let first = h.canvases.canvas(&CctvId::from_slot_index(0)).unwrap().snapshot();
    assert_eq!(first.pixel(10, 30), Some(Rgba::RED));
    assert_eq!(first.labels()[0].text, "ID: 0");
    assert_eq!(first.labels()[0].y, 15.0);

    let third = h.canvases.canvas(&CctvId::from_slot_index(2)).unwrap().snapshot();
    assert_eq!(third.labels()[0].text, "ID: 2");

    let untouched = h.canvases.canvas(&CctvId::from_slot_index(1)).unwrap().snapshot();
    assert_eq!(untouched.painted_pixels(), 0);
}

#[tokio::test]
async fn test_render_overlay_paints_in_input_order() {
    let mut h = harness(0);
    h.grid.initialize(1).await.unwrap();

    let results = vec![DetectionOverlayResult {
        cctv_id: "CCTV1".to_string(),
        detections: vec![
            detection(10.0, 10.0, 40.0, 40.0, 7),
            detection(20.0, 20.0, 60.0, 60.0, 8),
        ],
    }];
    h.grid.render_overlay(&results);

    let canvas = h.canvases.canvas(&CctvId::from_slot_index(0)).unwrap().snapshot();
    let labels: Vec<&str> = canvas.labels().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(labels, vec!["ID: 7", "ID: 8"]);
}

#[tokio::test]
async fn test_render_overlay_json() {
    let mut h = harness(0);
    h.grid.initialize(2).await.unwrap();

    let payload = r#"[
        {"cctv_id": "CCTV2", "detections": [{"x1": 5, "y1": 12, "x2": 25, "y2": 30, "class_id": 1, "confidence": 0.9}]}
    ]"#;
    let report = h.grid.render_overlay_json(payload).unwrap();
    assert_eq!(report.rendered, vec![CctvId::from_slot_index(1)]);

    let payload = r#"[
        {"cctv_id": "CCTV1", "detections": [{"x1": 5, "y1": 12, "x2": 25, "y2": 30, "class_id": "person"}]},
        {"cctv_id": "CCTV2", "detections": [{"x1": 8, "y1": 14, "x2": 28, "y2": 34, "class_id": 3}]}
    ]"#;
    let report = h.grid.render_overlay_json(payload).unwrap();
    assert_eq!(report.rendered, vec![CctvId::from_slot_index(1)]);
    let second = h.canvases.canvas(&CctvId::from_slot_index(1)).unwrap().snapshot();
    assert_eq!(second.labels()[0].text, "ID: 3");

    let err = h.grid.render_overlay_json("{not json").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Data);
    assert!(h.notifier.errors().is_empty());
}

// ============================================================================
// DETECTION JOB / STREAM LIFECYCLE
// ============================================================================

#[tokio::test]
async fn test_start_detection_notifies() {
    let mut h = harness(0);
    h.grid.start_detection().await.unwrap();
    assert_eq!(
        h.notifier.notifications(),
        vec![Notification::info("Object detection started")]
    );

    h.remote.push_detection(Err("HTTP 500".to_string()));
    let err = h.grid.start_detection().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Network);
    assert_eq!(h.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_disconnect_empties_bound_slot() {
    let mut h = harness(2);
    h.grid.initialize(3).await.unwrap();
    let mut events = h.grid.events();

    h.capture.disconnect(&DeviceId::new("mock_camera_1"));
    assert_eq!(h.grid.drain_capture_events().await, 1);

    assert!(h.grid.slot(0).unwrap().is_bound());
    assert!(h.grid.slot(1).unwrap().is_empty());
    assert_eq!(h.grid.live_streams(), 1);
    assert_eq!(
        events.try_recv().unwrap(),
        GridEvent::SlotEmpty {
            index: 1,
            cctv_id: CctvId::from_slot_index(1)
        }
    );

    // Already empty; a repeated end is ignored.
    assert!(!h.grid.handle_stream_ended(&DeviceId::new("mock_camera_1")).await);
    assert!(!h.grid.handle_stream_ended(&DeviceId::new("unknown")).await);
}

#[tokio::test]
async fn test_ended_stream_is_returned_to_backend() {
    let mut h = harness(2);
    h.capture.set_max_open_streams(Some(2));
    let report = h.grid.initialize(2).await.unwrap();
    assert_eq!(report.bound, 2);

    h.capture.disconnect(&DeviceId::new("mock_camera_1"));
    assert_eq!(h.grid.drain_capture_events().await, 1);
    assert_eq!(h.capture.open_streams(), 1);
    assert_eq!(h.capture.released_total(), 1);

    // Plugged back in: both handles fit under the limit again.
    h.capture.set_devices(vec![
        MockDevice::camera("mock_camera_0"),
        MockDevice::camera("mock_camera_1"),
    ]);
    let report = h.grid.initialize(2).await.unwrap();
    assert_eq!(report.bound, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(h.capture.open_streams(), 2);
}

#[tokio::test]
async fn test_teardown_releases_streams() {
    let mut h = harness(3);
    h.grid.initialize(3).await.unwrap();
    h.grid.teardown().await;

    assert_eq!(h.capture.open_streams(), 0);
    assert!(h.grid.slots().is_empty());
    assert!(h.grid.cctv_ids().is_empty());
    assert_eq!(h.canvases.canvas_count(), 0);
}

#[tokio::test]
async fn test_reinitialize_drops_surfaces_of_removed_slots() {
    let mut h = harness(1);
    h.grid.initialize(6).await.unwrap();
    assert_eq!(h.canvases.canvas_count(), 6);

    h.grid.initialize(2).await.unwrap();
    assert_eq!(h.canvases.canvas_count(), 2);
    assert!(h.canvases.canvas(&CctvId::from_slot_index(5)).is_none());
    assert!(h.canvases.canvas(&CctvId::from_slot_index(1)).is_some());
}

// ============================================================================
// FOCUS VIEW
// ============================================================================

#[tokio::test]
async fn test_focus_view_bind_failure() {
    let capture = MockCaptureBackend::with_devices(vec![
        MockDevice::camera("a").failing(MockFailure::PermissionDenied)
    ]);
    let notifier = RecordingNotifier::new();
    let mut view = FocusView::new(Arc::new(capture), Arc::new(notifier.clone()));

    let err = view.open(&CctvId::from_slot_index(0)).await.unwrap_err();
    assert!(matches!(err, CamwallError::StreamBind { .. }));
    assert_eq!(notifier.errors().len(), 1);
    assert!(view.cctv_id().is_none());
}

#[test]
fn test_builder_rejects_invalid_config() {
    let mut config = GridConfig::default();
    config.remote.base_url = "not-a-url".to_string();
    let err = GridController::builder().config(config).build().unwrap_err();
    assert!(matches!(err, CamwallError::InvalidConfiguration { .. }));
}

#[tokio::test]
async fn test_busy_device_reports_recoverable_error_event() {
    let mut h = harness_with(MockCaptureBackend::with_devices(vec![
        MockDevice::camera("a").failing(MockFailure::Busy)
    ]));
    let mut events = h.grid.events();
    h.grid.initialize(1).await.unwrap();

    let busy = MediaError::DeviceBusy {
        device_id: "a".to_string(),
    };
    assert!(busy.is_recoverable());

    let first = events.try_recv().unwrap();
    assert!(first.is_error_event());
    assert!(matches!(
        first,
        GridEvent::Error {
            code: "STREAM_BIND_ERROR",
            recoverable: true,
            ..
        }
    ));
    assert!(events.try_recv().unwrap().is_slot_event());
}
