//! Frame sources: the live camera, a replay directory, and still images.

#[cfg(feature = "camera")]
pub mod camera;
pub mod replay;
pub mod still;
pub mod worker;

use chrono::{DateTime, Utc};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::settings::SourceSettings;

pub use replay::ReplaySource;
pub use worker::{CaptureHandle, SourceOpener};

/// One grayscale raster handed from a source to the decoder. Not kept after
/// the tick that produced it.
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: GrayImage,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(pixels: GrayImage, captured_at: DateTime<Utc>) -> Self {
        Self {
            pixels,
            captured_at,
        }
    }

    pub fn from_image(image: &DynamicImage, captured_at: DateTime<Utc>) -> Self {
        Self::new(image.to_luma8(), captured_at)
    }

    pub fn from_rgb(image: RgbImage, captured_at: DateTime<Utc>) -> Self {
        Self::new(DynamicImage::ImageRgb8(image).into_luma8(), captured_at)
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Produces frames on demand. `None` means no frame this tick.
///
/// Sources are created and used on the capture thread only, so they do not
/// need to be `Send`.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Build the opener for the configured source. The returned closure runs on
/// the capture thread.
pub fn opener_for(source: &SourceSettings) -> SourceOpener {
    match source.clone() {
        SourceSettings::Camera { index } => camera_opener(index),
        SourceSettings::Replay { dir } => {
            Box::new(move || -> crate::error::Result<Box<dyn FrameSource>> {
                let source = ReplaySource::open(&dir)?;
                Ok(Box::new(source))
            })
        }
    }
}

#[cfg(feature = "camera")]
fn camera_opener(index: u32) -> SourceOpener {
    Box::new(move || -> crate::error::Result<Box<dyn FrameSource>> {
        let source = camera::CameraSource::open(index)?;
        Ok(Box::new(source))
    })
}

#[cfg(not(feature = "camera"))]
fn camera_opener(index: u32) -> SourceOpener {
    use crate::error::{Result, ScanError};

    Box::new(move || -> Result<Box<dyn FrameSource>> {
        Err(ScanError::CameraUnavailable(format!(
            "camera {index} requested but this build has no camera support"
        )))
    })
}
