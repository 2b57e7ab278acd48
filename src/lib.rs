pub mod capture;
pub mod decode;
pub mod error;
pub mod scan;
pub mod settings;
pub mod utils;

use std::sync::Arc;

use decode::QrDecoder;
use scan::ScanController;
use settings::Settings;

pub use error::ScanError;

#[cfg(feature = "desktop")]
pub(crate) struct AppState {
    pub(crate) scanner: ScanController,
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use log::warn;
    use scan::{
        commands::{
            get_scan_state, reset_scan, scan_image, scan_image_data, start_scanning,
            stop_scanning,
        },
        sink::TauriSink,
    };
    use tauri::Manager;

    utils::logging::init();
    log::info!("scancube starting up...");

    tauri::Builder::default()
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let config_dir = app.path().app_config_dir().ok();
                let settings_path = Settings::resolve_path(config_dir.as_deref());
                let settings = Settings::load(&settings_path)?;
                log::info!("Using settings from {}", settings_path.display());

                let scanner = ScanController::new(
                    settings,
                    Arc::new(QrDecoder::new()),
                    Arc::new(TauriSink::new(app.handle().clone())),
                );
                app.manage(AppState {
                    scanner: scanner.clone(),
                });

                // A missing camera is reported to the window; it does not
                // stop the app.
                tauri::async_runtime::spawn(async move {
                    if let Err(err) = scanner.start().await {
                        warn!("Live scanning unavailable: {err}");
                    }
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                let scanner = window.state::<AppState>().scanner.clone();
                tauri::async_runtime::block_on(async move {
                    if let Err(err) = scanner.stop().await {
                        log::error!("Failed to stop scanning on close: {err:?}");
                    }
                });
            }
        })
        .invoke_handler(tauri::generate_handler![
            get_scan_state,
            reset_scan,
            scan_image,
            scan_image_data,
            start_scanning,
            stop_scanning,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

/// Console shell: scan until Ctrl-C, printing each new result.
#[cfg(not(feature = "desktop"))]
pub fn run() {
    utils::logging::init();
    log::info!("scancube starting up...");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start async runtime: {err}");
            return;
        }
    };

    if let Err(err) = runtime.block_on(run_console()) {
        log::error!("{err:?}");
    }
}

#[cfg(not(feature = "desktop"))]
async fn run_console() -> anyhow::Result<()> {
    use anyhow::Context;
    use scan::ConsoleSink;

    let settings_path = Settings::resolve_path(None);
    let settings = Settings::load(&settings_path)?;

    let scanner = ScanController::new(
        settings,
        Arc::new(QrDecoder::new()),
        Arc::new(ConsoleSink::new()),
    );

    if let Err(err) = scanner.start().await {
        log::warn!("Live scanning unavailable ({err}); press Ctrl-C to quit");
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    scanner.stop().await
}
