#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod preview;
pub mod session;
pub mod sink;
pub mod state;

pub use controller::ScanController;
pub use preview::{FramePreview, PreviewOverlay};
pub use session::{FrameScan, ScanOutcome, ScanSession};
pub use sink::{ConsoleSink, ScanSink, ScanStatus};
pub use state::{ResultOrigin, ScanResult, ScanSnapshot, ScanState};
