use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("cannot load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot decode image data: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("cannot encode preview frame: {0}")]
    PreviewEncode(#[source] image::ImageError),

    #[error("scanning already active")]
    AlreadyRunning,

    #[error("capture worker is gone")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, ScanError>;
