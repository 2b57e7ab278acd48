use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::decode::{BoundingBox, DecodedSymbol, Symbology};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResultOrigin {
    Stream,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub text: String,
    pub symbology: Symbology,
    pub bounding_box: BoundingBox,
    pub acquired_at: DateTime<Utc>,
    pub origin: ResultOrigin,
}

impl ScanResult {
    pub fn from_symbol(
        symbol: DecodedSymbol,
        acquired_at: DateTime<Utc>,
        origin: ResultOrigin,
    ) -> Self {
        Self {
            text: symbol.text,
            symbology: symbol.symbology,
            bounding_box: symbol.bounds,
            acquired_at,
            origin,
        }
    }

    /// `TEXT (SYMBOLOGY)`, the line shown in the results box.
    pub fn label(&self) -> String {
        format!("{} ({})", self.text, self.symbology)
    }
}

/// What the UI gets to see.
///
/// `revision` grows with every visible change, so a shell can drop a
/// snapshot older than the one it already shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    pub revision: u64,
    pub current: Option<ScanResult>,
    pub history: Vec<ScanResult>,
    pub running: bool,
    pub camera_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScanState {
    current: Option<ScanResult>,
    /// De-duplication key for the live stream only.
    last_accepted: Option<String>,
    running: bool,
    camera_error: Option<String>,
    history: VecDeque<ScanResult>,
    history_limit: usize,
    revision: u64,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ScanState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            current: None,
            last_accepted: None,
            running: false,
            camera_error: None,
            history: VecDeque::new(),
            history_limit,
            revision: 0,
        }
    }

    pub fn current(&self) -> Option<&ScanResult> {
        self.current.as_ref()
    }

    pub fn last_accepted(&self) -> Option<&str> {
        self.last_accepted.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn camera_error(&self) -> Option<&str> {
        self.camera_error.as_deref()
    }

    pub fn history(&self) -> impl Iterator<Item = &ScanResult> {
        self.history.iter()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Accept a live-stream result unless its text matches the last one
    /// accepted from the stream. Returns whether the state changed.
    pub fn accept_stream(&mut self, result: ScanResult) -> bool {
        if self.last_accepted.as_deref() == Some(result.text.as_str()) {
            return false;
        }

        self.last_accepted = Some(result.text.clone());
        self.replace_current(result);
        true
    }

    /// A loaded image always wins and leaves the stream's de-duplication key
    /// alone.
    pub fn accept_image(&mut self, result: ScanResult) {
        self.replace_current(result);
    }

    /// Record a result that was seen alongside the current one. Only the
    /// history changes.
    pub fn record_seen(&mut self, result: &ScanResult) {
        if self.record_history(result) {
            self.revision += 1;
        }
    }

    pub fn set_running(&mut self, running: bool) {
        if self.running != running {
            self.running = running;
            self.revision += 1;
        }
    }

    pub fn set_camera_error(&mut self, error: Option<String>) {
        if self.camera_error != error {
            self.camera_error = error;
            self.revision += 1;
        }
    }

    /// Clears the result, the de-duplication key and the history. The running
    /// flag and any camera error survive.
    pub fn reset(&mut self) {
        self.current = None;
        self.last_accepted = None;
        self.history.clear();
        self.revision += 1;
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            revision: self.revision,
            current: self.current.clone(),
            history: self.history.iter().cloned().collect(),
            running: self.running,
            camera_error: self.camera_error.clone(),
        }
    }

    fn replace_current(&mut self, result: ScanResult) {
        self.record_history(&result);
        self.current = Some(result);
        self.revision += 1;
    }

    /// Returns whether the entry was new.
    fn record_history(&mut self, result: &ScanResult) -> bool {
        if self.history_limit == 0 || self.history.iter().any(|r| r.text == result.text) {
            return false;
        }
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(result.clone());
        true
    }
}
