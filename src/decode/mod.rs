//! Decoder adapter: frame in, decoded symbols out.
//!
//! Symbol recognition itself is delegated to a third-party decoder; this
//! module only fixes the shape of what comes back so the scan session can
//! stay decoder-agnostic.

pub mod qr;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capture::Frame;

pub use qr::QrDecoder;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Symbology {
    QrCode,
    /// A symbology reported by an adapter that has no dedicated tag here.
    Other(String),
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbology::QrCode => f.write_str("QRCODE"),
            Symbology::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box around a symbol, `(x, y)` being the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Four corners in frame pixel coordinates, in decoder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox(pub [Point; 4]);

impl BoundingBox {
    pub fn corners(&self) -> &[Point; 4] {
        &self.0
    }

    pub fn rect(&self) -> Rect {
        let xs = self.0.iter().map(|p| p.x);
        let ys = self.0.iter().map(|p| p.y);
        let (min_x, max_x) = (xs.clone().min().unwrap_or(0), xs.max().unwrap_or(0));
        let (min_y, max_y) = (ys.clone().min().unwrap_or(0), ys.max().unwrap_or(0));

        Rect {
            x: min_x,
            y: min_y,
            width: max_x.abs_diff(min_x),
            height: max_y.abs_diff(min_y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    pub text: String,
    pub symbology: Symbology,
    pub bounds: BoundingBox,
}

/// Anything that can find barcodes in a frame.
///
/// Results come back in scan order. An empty vector means "nothing visible";
/// implementations never treat that as an error.
pub trait Decoder: Send + Sync {
    fn decode(&self, frame: &Frame) -> Vec<DecodedSymbol>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbology_displays_upper_case_tag() {
        assert_eq!(Symbology::QrCode.to_string(), "QRCODE");
        assert_eq!(Symbology::Other("EAN13".into()).to_string(), "EAN13");
    }

    #[test]
    fn rect_spans_all_corners() {
        let bounds = BoundingBox([
            Point::new(12, 40),
            Point::new(90, 38),
            Point::new(92, 110),
            Point::new(10, 112),
        ]);

        assert_eq!(
            bounds.rect(),
            Rect {
                x: 10,
                y: 38,
                width: 82,
                height: 74,
            }
        );
    }
}
