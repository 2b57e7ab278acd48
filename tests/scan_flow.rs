// End-to-end checks through the public API: real image files, the replay
// source, and the controller's lifecycle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{GrayImage, Luma};
use scancube_lib::capture::Frame;
use scancube_lib::decode::{BoundingBox, DecodedSymbol, Decoder, Point, QrDecoder, Symbology};
use scancube_lib::scan::{
    ScanController, ScanOutcome, ScanSession, ScanSink, ScanSnapshot, ScanStatus,
};
use scancube_lib::settings::{Settings, SourceSettings};

/// Reads the barcode text from the frame's width, so each replay image
/// "contains" a known payload.
struct WidthDecoder;

impl Decoder for WidthDecoder {
    fn decode(&self, frame: &Frame) -> Vec<DecodedSymbol> {
        match frame.width() {
            10 => vec![symbol("ABC123")],
            20 => vec![symbol("XYZ999")],
            _ => Vec::new(),
        }
    }
}

fn symbol(text: &str) -> DecodedSymbol {
    DecodedSymbol {
        text: text.to_string(),
        symbology: Symbology::Other("CODE128".into()),
        bounds: BoundingBox([Point::new(1, 1); 4]),
    }
}

#[derive(Default)]
struct Collect {
    snapshots: Mutex<Vec<ScanSnapshot>>,
    statuses: Mutex<Vec<ScanStatus>>,
}

impl ScanSink for Collect {
    fn state_changed(&self, snapshot: &ScanSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }

    fn status(&self, status: &ScanStatus) {
        self.statuses.lock().unwrap().push(status.clone());
    }
}

fn frame(width: u32) -> Frame {
    Frame::new(
        GrayImage::from_pixel(width, 4, Luma([255])),
        chrono::Utc::now(),
    )
}

#[test]
fn tick_scenario_matches_observable_sequence() {
    let mut session = ScanSession::new(Arc::new(WidthDecoder), 10);

    let observed: Vec<String> = [10, 10, 10, 20, 5]
        .into_iter()
        .filter_map(|width| match session.on_tick(frame(width)) {
            ScanOutcome::Accepted { result, .. } => Some(result.label()),
            _ => None,
        })
        .collect();

    assert_eq!(observed, vec!["ABC123 (CODE128)", "XYZ999 (CODE128)"]);
}

#[test]
fn loading_an_image_from_disk_replaces_the_stream_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("printed.png");
    GrayImage::from_pixel(10, 4, Luma([0])).save(&path).unwrap();

    let mut session = ScanSession::new(Arc::new(WidthDecoder), 10);
    session.on_tick(frame(10));

    let outcome = session.on_load_image(&path).unwrap();
    assert!(outcome.changed());
    assert_eq!(session.state().last_accepted(), Some("ABC123"));
    assert_eq!(session.snapshot().history.len(), 1);
}

#[test]
fn qr_decoder_finds_nothing_in_a_plain_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.png");
    GrayImage::from_pixel(32, 32, Luma([255])).save(&path).unwrap();

    let mut session = ScanSession::new(Arc::new(QrDecoder::new()), 10);
    assert_eq!(session.on_load_image(&path).unwrap(), ScanOutcome::NothingFound);
    assert!(session.snapshot().current.is_none());
}

#[tokio::test]
async fn replay_source_drives_the_controller() {
    let dir = tempfile::tempdir().unwrap();
    GrayImage::from_pixel(10, 4, Luma([0]))
        .save(dir.path().join("frame-01.png"))
        .unwrap();

    let settings = Settings {
        source: SourceSettings::Replay {
            dir: dir.path().to_path_buf(),
        },
        tick_interval_ms: 1,
        ..Settings::default()
    };
    let sink = Arc::new(Collect::default());
    let controller = ScanController::new(settings, Arc::new(WidthDecoder), sink.clone());

    controller.start().await.unwrap();
    let mut found = false;
    for _ in 0..500 {
        if controller.snapshot().await.current.is_some() {
            found = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    controller.stop().await.unwrap();

    assert!(found, "replayed frame was never accepted");
    let snapshot = controller.snapshot().await;
    assert!(!snapshot.running);
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(
        sink.statuses.lock().unwrap().clone(),
        vec![ScanStatus::Started, ScanStatus::Stopped]
    );
}

#[tokio::test]
async fn empty_replay_directory_counts_as_unavailable_camera() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        source: SourceSettings::Replay {
            dir: dir.path().to_path_buf(),
        },
        ..Settings::default()
    };
    let sink = Arc::new(Collect::default());
    let controller = ScanController::new(settings, Arc::new(WidthDecoder), sink.clone());

    assert!(controller.start().await.is_err());
    assert!(controller.snapshot().await.camera_error.is_some());
    assert!(matches!(
        sink.statuses.lock().unwrap().as_slice(),
        [ScanStatus::CameraUnavailable { .. }]
    ));
}
