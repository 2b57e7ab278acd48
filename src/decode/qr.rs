use super::{BoundingBox, DecodedSymbol, Decoder, Point, Symbology};
use crate::capture::Frame;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// QR decoding through `rqrr`.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for QrDecoder {
    fn decode(&self, frame: &Frame) -> Vec<DecodedSymbol> {
        let pixels = frame.pixels();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            pixels.width() as usize,
            pixels.height() as usize,
            |x, y| pixels.get_pixel(x as u32, y as u32).0[0],
        );

        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_meta, text)) => Some(DecodedSymbol {
                    text,
                    symbology: Symbology::QrCode,
                    bounds: BoundingBox(grid.bounds.map(|p| Point::new(p.x, p.y))),
                }),
                Err(err) => {
                    // A finder pattern without a readable payload; usually motion blur.
                    log_debug!("skipping undecodable QR grid: {err}");
                    None
                }
            })
            .collect()
    }
}
