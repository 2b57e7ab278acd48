use chrono::Utc;
use image::RgbImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};

use super::{Frame, FrameSource};
use crate::error::{Result, ScanError};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// A camera device with an open stream. The stream is stopped on drop.
pub struct CameraSource {
    camera: Camera,
}

impl CameraSource {
    pub fn open(index: u32) -> Result<Self> {
        let format =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), format)
            .map_err(|err| ScanError::CameraUnavailable(format!("camera {index}: {err}")))?;
        camera
            .open_stream()
            .map_err(|err| ScanError::CameraUnavailable(format!("camera {index}: {err}")))?;

        log_info!("Opened camera {index} ({})", camera.info().human_name());
        Ok(Self { camera })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Option<Frame> {
        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(err) => {
                log_warn!("camera frame read failed: {err}");
                return None;
            }
        };

        let decoded = match buffer.decode_image::<RgbFormat>() {
            Ok(decoded) => decoded,
            Err(err) => {
                log_warn!("camera frame decode failed: {err}");
                return None;
            }
        };

        let (width, height) = (decoded.width(), decoded.height());
        let rgb = RgbImage::from_raw(width, height, decoded.into_raw())?;
        Some(Frame::from_rgb(rgb, Utc::now()))
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(err) = self.camera.stop_stream() {
            log_warn!("failed to stop camera stream: {err}");
        } else {
            log_info!("Camera released");
        }
    }
}
