use std::{
    fs,
    path::{Path, PathBuf},
};

use super::{still, Frame, FrameSource};
use crate::error::{Result, ScanError};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "pgm", "ppm"];

/// Plays back the images of a directory in file-name order, looping forever.
/// Stands in for a camera on machines without one.
#[derive(Debug)]
pub struct ReplaySource {
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ReplaySource {
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|err| {
            ScanError::CameraUnavailable(format!(
                "replay directory {} unreadable: {err}",
                dir.display()
            ))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(ScanError::CameraUnavailable(format!(
                "replay directory {} has no images",
                dir.display()
            )));
        }

        log_info!("replaying {} images from {}", paths.len(), dir.display());
        Ok(Self { paths, cursor: 0 })
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Option<Frame> {
        let path = &self.paths[self.cursor];
        self.cursor = (self.cursor + 1) % self.paths.len();

        match still::load_frame(path) {
            Ok(frame) => Some(frame),
            Err(err) => {
                log_warn!("replay frame skipped: {err}");
                None
            }
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_png(dir: &Path, name: &str, width: u32) {
        GrayImage::from_pixel(width, 2, Luma([0]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn cycles_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", 2);
        write_png(dir.path(), "a.png", 1);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ReplaySource::open(dir.path()).unwrap();
        assert_eq!(source.paths.len(), 2);

        let widths: Vec<u32> = (0..4)
            .map(|_| source.next_frame().unwrap().width())
            .collect();
        assert_eq!(widths, vec![1, 2, 1, 2]);
    }

    #[test]
    fn empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReplaySource::open(dir.path()).unwrap_err();
        assert!(matches!(err, ScanError::CameraUnavailable(_)));
    }

    #[test]
    fn unreadable_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), b"nope").unwrap();

        let mut source = ReplaySource::open(dir.path()).unwrap();
        assert!(source.next_frame().is_none());
    }
}
