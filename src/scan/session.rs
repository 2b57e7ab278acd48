use serde::Serialize;
use std::{path::Path, sync::Arc};

use super::state::{ResultOrigin, ScanResult, ScanSnapshot, ScanState};
use crate::capture::{still, Frame};
use crate::decode::Decoder;
use crate::error::Result;

const ENABLE_LOGS: bool = false;

use crate::log_debug;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanOutcome {
    /// A new result became current; the UI should refresh. `found` holds
    /// every symbol decoded from the frame in scan order, `result` first.
    Accepted {
        result: ScanResult,
        found: Vec<ScanResult>,
    },
    /// Same text as the last accepted stream result.
    Unchanged,
    NothingFound,
}

impl ScanOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ScanOutcome::Accepted { .. })
    }
}

/// What one live frame produced: the acceptance decision plus everything
/// the decoder saw, for drawing overlays.
#[derive(Debug, Clone)]
pub struct FrameScan {
    pub outcome: ScanOutcome,
    pub seen: Vec<ScanResult>,
}

/// Turns frames and loaded images into a de-duplicated stream of accepted
/// results.
///
/// With several symbols in one frame the first in decoder scan order becomes
/// current; the rest still land in the history.
pub struct ScanSession {
    decoder: Arc<dyn Decoder>,
    state: ScanState,
}

impl ScanSession {
    pub fn new(decoder: Arc<dyn Decoder>, history_limit: usize) -> Self {
        Self {
            decoder,
            state: ScanState::new(history_limit),
        }
    }

    pub fn on_tick(&mut self, frame: Frame) -> ScanOutcome {
        self.scan_frame(&frame).outcome
    }

    /// Same as [`on_tick`](Self::on_tick), keeping every decoded symbol.
    pub fn scan_frame(&mut self, frame: &Frame) -> FrameScan {
        let seen = self.results_for(frame, ResultOrigin::Stream);
        let Some(first) = seen.first() else {
            return FrameScan {
                outcome: ScanOutcome::NothingFound,
                seen,
            };
        };

        let accepted = self.state.accept_stream(first.clone());
        for other in &seen[1..] {
            self.state.record_seen(other);
        }

        let outcome = if accepted {
            log_debug!("accepted {}", first.label());
            ScanOutcome::Accepted {
                result: first.clone(),
                found: seen.clone(),
            }
        } else {
            ScanOutcome::Unchanged
        };
        FrameScan { outcome, seen }
    }

    /// Decode a still image from disk. On load failure the state is left as
    /// it was.
    pub fn on_load_image(&mut self, path: &Path) -> Result<ScanOutcome> {
        let frame = still::load_frame(path)?;
        Ok(self.accept_still(&frame))
    }

    pub fn on_load_image_bytes(&mut self, bytes: &[u8]) -> Result<ScanOutcome> {
        let frame = still::frame_from_bytes(bytes)?;
        Ok(self.accept_still(&frame))
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn set_running(&mut self, running: bool) {
        self.state.set_running(running);
    }

    pub fn set_camera_error(&mut self, error: Option<String>) {
        self.state.set_camera_error(error);
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.state.snapshot()
    }

    fn accept_still(&mut self, frame: &Frame) -> ScanOutcome {
        let found = self.results_for(frame, ResultOrigin::Image);
        let Some(result) = found.first().cloned() else {
            return ScanOutcome::NothingFound;
        };

        self.state.accept_image(result.clone());
        for other in &found[1..] {
            self.state.record_seen(other);
        }
        ScanOutcome::Accepted { result, found }
    }

    fn results_for(&self, frame: &Frame, origin: ResultOrigin) -> Vec<ScanResult> {
        self.decoder
            .decode(frame)
            .into_iter()
            .map(|symbol| ScanResult::from_symbol(symbol, frame.captured_at(), origin))
            .collect()
    }
}
