//! Logger setup plus module-gated logging macros.
//!
//! The tick and capture paths log on every frame, so each module that uses
//! the macros declares its own switch:
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("only printed while ENABLE_LOGS is true");
//! ```

use env_logger::Env;
use log::LevelFilter;

/// Set to `1` or `true` to raise the default level to debug.
pub const DEBUG_ENV: &str = "SCANCUBE_DEBUG";

/// Initialise `env_logger` from `RUST_LOG`, falling back to `info`
/// (or `debug` when `SCANCUBE_DEBUG` is set). Safe to call more than once.
pub fn init() {
    let default_level = if debug_mode() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::from_env(
        Env::default().default_filter_or(default_level.as_str().to_ascii_lowercase()),
    )
    .try_init();
}

pub fn debug_mode() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Info logging gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
