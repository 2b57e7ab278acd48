use serde::Serialize;
use std::sync::Mutex;

use super::preview::FramePreview;
use super::state::{ResultOrigin, ScanResult, ScanSnapshot};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanStatus {
    Started,
    Stopped,
    CameraUnavailable { message: String },
}

/// Where the controller publishes changes: the window in desktop builds,
/// the terminal otherwise.
///
/// The controller calls `state_changed` while it holds the session lock, so
/// snapshots arrive in revision order.
pub trait ScanSink: Send + Sync {
    fn state_changed(&self, snapshot: &ScanSnapshot);
    fn status(&self, status: &ScanStatus);

    /// Whether the controller should render a preview of every frame.
    fn wants_preview(&self) -> bool {
        false
    }

    fn preview(&self, _preview: &FramePreview) {}
}

/// Prints results as `TEXT (SYMBOLOGY)` lines: every result that joins the
/// history, and every loaded image result even when its text is known.
#[derive(Default)]
pub struct ConsoleSink {
    last: Mutex<Option<ScanSnapshot>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScanSink for ConsoleSink {
    fn state_changed(&self, snapshot: &ScanSnapshot) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        for line in new_lines(last.as_ref(), snapshot) {
            println!("{line}");
        }
        *last = Some(snapshot.clone());
    }

    fn status(&self, status: &ScanStatus) {
        match status {
            ScanStatus::Started => log::info!("Scanning started"),
            ScanStatus::Stopped => log::info!("Scanning stopped"),
            ScanStatus::CameraUnavailable { message } => {
                log::warn!("Camera feed not available: {message}")
            }
        }
    }
}

/// Lines to print for `next`, given what was printed for `previous`.
fn new_lines(previous: Option<&ScanSnapshot>, next: &ScanSnapshot) -> Vec<String> {
    let known = |result: &ScanResult| {
        previous.is_some_and(|p| p.history.iter().any(|r| r.text == result.text))
    };
    let mut lines: Vec<String> = next
        .history
        .iter()
        .filter(|result| !known(*result))
        .map(ScanResult::label)
        .collect();

    if let Some(current) = &next.current {
        let fresh_image = current.origin == ResultOrigin::Image
            && previous.and_then(|p| p.current.as_ref()) != Some(current);
        let label = current.label();
        if fresh_image && !lines.contains(&label) {
            lines.insert(0, label);
        }
    }
    lines
}

#[cfg(feature = "desktop")]
pub use desktop::TauriSink;

#[cfg(feature = "desktop")]
mod desktop {
    use tauri::{AppHandle, Emitter};

    use super::{FramePreview, ScanSink, ScanSnapshot, ScanStatus};

    pub const STATE_CHANGED_EVENT: &str = "scan-state-changed";
    pub const STATUS_EVENT: &str = "scan-status";
    pub const PREVIEW_EVENT: &str = "scan-preview";

    /// Forwards changes to the webview as Tauri events.
    pub struct TauriSink {
        app_handle: AppHandle,
    }

    impl TauriSink {
        pub fn new(app_handle: AppHandle) -> Self {
            Self { app_handle }
        }
    }

    impl ScanSink for TauriSink {
        fn state_changed(&self, snapshot: &ScanSnapshot) {
            if let Err(err) = self.app_handle.emit(STATE_CHANGED_EVENT, snapshot) {
                log::error!("failed to emit {STATE_CHANGED_EVENT}: {err}");
            }
        }

        fn status(&self, status: &ScanStatus) {
            if let Err(err) = self.app_handle.emit(STATUS_EVENT, status) {
                log::error!("failed to emit {STATUS_EVENT}: {err}");
            }
        }

        fn wants_preview(&self) -> bool {
            true
        }

        fn preview(&self, preview: &FramePreview) {
            if let Err(err) = self.app_handle.emit(PREVIEW_EVENT, preview) {
                log::error!("failed to emit {PREVIEW_EVENT}: {err}");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{FramePreview, ScanSink, ScanSnapshot, ScanStatus};

    #[derive(Default)]
    pub struct RecordingSink {
        pub snapshots: Mutex<Vec<ScanSnapshot>>,
        pub statuses: Mutex<Vec<ScanStatus>>,
        pub previews: Mutex<Vec<FramePreview>>,
        pub record_previews: bool,
    }

    impl RecordingSink {
        pub fn snapshots(&self) -> Vec<ScanSnapshot> {
            self.snapshots.lock().unwrap().clone()
        }

        pub fn statuses(&self) -> Vec<ScanStatus> {
            self.statuses.lock().unwrap().clone()
        }

        pub fn previews(&self) -> Vec<FramePreview> {
            self.previews.lock().unwrap().clone()
        }
    }

    impl ScanSink for RecordingSink {
        fn state_changed(&self, snapshot: &ScanSnapshot) {
            self.snapshots.lock().unwrap().push(snapshot.clone());
        }

        fn status(&self, status: &ScanStatus) {
            self.statuses.lock().unwrap().push(status.clone());
        }

        fn wants_preview(&self) -> bool {
            self.record_previews
        }

        fn preview(&self, preview: &FramePreview) {
            self.previews.lock().unwrap().push(preview.clone());
        }
    }
}
