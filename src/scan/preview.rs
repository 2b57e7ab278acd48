use base64::{engine::general_purpose::STANDARD, Engine};
use image::{
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
};
use serde::Serialize;

use super::state::ScanResult;
use crate::capture::Frame;
use crate::decode::{BoundingBox, Point, Rect};
use crate::error::{Result, ScanError};

const JPEG_QUALITY: u8 = 70;

/// One decoded symbol outlined on the preview, in preview pixels.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOverlay {
    pub corners: [Point; 4],
    /// Where the label goes: the label sits just above `rect`.
    pub rect: Rect,
    pub label: String,
}

/// A downscaled JPEG of the latest frame plus the symbols found in it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FramePreview {
    pub width: u32,
    pub height: u32,
    /// `data:image/jpeg;base64,...`, usable as an `<img>` source.
    pub image: String,
    pub overlays: Vec<PreviewOverlay>,
}

impl FramePreview {
    /// Frames wider than `max_width` are scaled down with their aspect kept.
    /// A `max_width` of 0 keeps the frame size.
    pub fn render(frame: &Frame, seen: &[ScanResult], max_width: u32) -> Result<Self> {
        let (width, height) = if max_width > 0 && frame.width() > max_width {
            let scaled = frame.height() as f32 * max_width as f32 / frame.width() as f32;
            (max_width, (scaled.round() as u32).max(1))
        } else {
            (frame.width(), frame.height())
        };
        let scale = width as f32 / frame.width().max(1) as f32;

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
        let encoded = if width == frame.width() {
            encoder.encode_image(frame.pixels())
        } else {
            let small = imageops::resize(frame.pixels(), width, height, FilterType::Triangle);
            encoder.encode_image(&small)
        };
        encoded.map_err(ScanError::PreviewEncode)?;

        let overlays = seen
            .iter()
            .map(|result| {
                let corners = result
                    .bounding_box
                    .corners()
                    .map(|corner| scale_point(corner, scale));
                PreviewOverlay {
                    corners,
                    rect: BoundingBox(corners).rect(),
                    label: result.label(),
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            image: format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)),
            overlays,
        })
    }
}

fn scale_point(point: Point, scale: f32) -> Point {
    Point::new(
        (point.x as f32 * scale).round() as i32,
        (point.y as f32 * scale).round() as i32,
    )
}
