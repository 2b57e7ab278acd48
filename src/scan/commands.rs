use std::path::PathBuf;

use tauri::State;

use crate::{
    scan::{ScanController, ScanOutcome, ScanSnapshot},
    AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> ScanController {
    state.scanner.clone()
}

#[tauri::command]
pub async fn get_scan_state(state: State<'_, AppState>) -> Result<ScanSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn reset_scan(state: State<'_, AppState>) -> Result<ScanSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.reset().await)
}

#[tauri::command]
pub async fn scan_image(state: State<'_, AppState>, path: String) -> Result<ScanOutcome, String> {
    let controller = controller_from_state(&state);
    controller
        .scan_image(PathBuf::from(path))
        .await
        .map_err(|e| e.to_string())
}

/// The file picker in the webview hands over bytes, not a path.
#[tauri::command]
pub async fn scan_image_data(
    state: State<'_, AppState>,
    data: Vec<u8>,
) -> Result<ScanOutcome, String> {
    let controller = controller_from_state(&state);
    controller
        .scan_image_bytes(data)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn start_scanning(state: State<'_, AppState>) -> Result<ScanSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.start().await.map_err(|e| e.to_string())?;
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn stop_scanning(state: State<'_, AppState>) -> Result<ScanSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.stop().await.map_err(|e| e.to_string())?;
    Ok(controller.snapshot().await)
}
