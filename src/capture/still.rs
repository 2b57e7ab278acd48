use chrono::Utc;
use std::path::Path;

use super::Frame;
use crate::error::{Result, ScanError};

/// Load a still image from disk as a single frame.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).map_err(|source| ScanError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Frame::from_image(&image, Utc::now()))
}

/// Decode an in-memory encoded image (PNG, JPEG, ...) as a single frame.
pub fn frame_from_bytes(bytes: &[u8]) -> Result<Frame> {
    let image = image::load_from_memory(bytes)?;
    Ok(Frame::from_image(&image, Utc::now()))
}
