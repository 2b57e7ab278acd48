use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "SCANCUBE_CONFIG";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

const FALLBACK_SETTINGS_PATH: &str = "scancube.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceSettings {
    Camera { index: u32 },
    /// Cycle through the still images of a directory instead of a device.
    Replay { dir: PathBuf },
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::Camera { index: 0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub source: SourceSettings,
    pub tick_interval_ms: u64,
    pub decode_timeout_ms: u64,
    pub history_limit: usize,
    /// Widest preview sent to the window, in pixels. 0 keeps full size.
    pub preview_width: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            tick_interval_ms: 30,
            decode_timeout_ms: 1_000,
            history_limit: 50,
            preview_width: 640,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults; a file
    /// that is present but not valid JSON is logged and ignored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(
                    "Ignoring malformed settings file {}: {err}",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// `SCANCUBE_CONFIG` wins, then `config_dir/settings.json`, then
    /// `./scancube.json`.
    pub fn resolve_path(config_dir: Option<&Path>) -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        match config_dir {
            Some(dir) => dir.join(SETTINGS_FILE_NAME),
            None => PathBuf::from(FALLBACK_SETTINGS_PATH),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms.max(1))
    }
}
