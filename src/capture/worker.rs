use std::{
    sync::mpsc::{self, Sender},
    thread::{self, JoinHandle},
};

use tokio::sync::oneshot;

use super::{Frame, FrameSource};
use crate::error::{Result, ScanError};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Opens a frame source. Runs on the capture thread, so the source it
/// returns never has to cross threads.
pub type SourceOpener = Box<dyn FnOnce() -> Result<Box<dyn FrameSource>> + Send + 'static>;

enum CaptureCommand {
    Grab(oneshot::Sender<Option<Frame>>),
    Shutdown,
}

/// Handle to the dedicated thread that owns the frame source.
///
/// Dropping the handle shuts the thread down and joins it, which releases
/// the device.
pub struct CaptureHandle {
    tx: Sender<CaptureCommand>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    /// Spawn the capture thread and open the source on it. Resolves once the
    /// source is ready, or with the opener's error.
    pub async fn open(opener: SourceOpener) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<CaptureCommand>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        let worker = thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                let mut source = match opener() {
                    Ok(source) => {
                        let _ = ready_tx.send(Ok(()));
                        source
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        CaptureCommand::Grab(reply) => {
                            // The requester may have timed out already.
                            let _ = reply.send(source.next_frame());
                        }
                        CaptureCommand::Shutdown => break,
                    }
                }

                drop(source);
                log_info!("capture thread exited, frame source released");
            })
            .map_err(|err| {
                ScanError::CameraUnavailable(format!("failed to spawn capture thread: {err}"))
            })?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self {
                tx,
                worker: Some(worker),
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ScanError::WorkerGone),
        }
    }

    /// Ask the source for one frame.
    pub async fn grab(&self) -> Result<Option<Frame>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(CaptureCommand::Grab(reply_tx))
            .map_err(|_| ScanError::WorkerGone)?;
        reply_rx.await.map_err(|_| ScanError::WorkerGone)
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            // Fails only when the thread is already gone.
            let _ = self.tx.send(CaptureCommand::Shutdown);
            if let Err(join_err) = handle.join() {
                log_error!("Failed to join capture thread: {join_err:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::{GrayImage, Luma};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    struct CountingSource {
        remaining: u32,
        released: Arc<AtomicBool>,
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self) -> Option<Frame> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            Some(Frame::new(
                GrayImage::from_pixel(self.remaining + 1, 1, Luma([0])),
                Utc::now(),
            ))
        }
    }

    impl Drop for CountingSource {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn counting_opener(frames: u32, released: Arc<AtomicBool>) -> SourceOpener {
        Box::new(move || -> Result<Box<dyn FrameSource>> {
            Ok(Box::new(CountingSource {
                remaining: frames,
                released,
            }) as Box<dyn FrameSource>)
        })
    }

    #[tokio::test]
    async fn grabs_frames_until_source_runs_dry() {
        let released = Arc::new(AtomicBool::new(false));
        let handle = CaptureHandle::open(counting_opener(2, released.clone()))
            .await
            .unwrap();

        assert_eq!(handle.grab().await.unwrap().map(|f| f.width()), Some(2));
        assert_eq!(handle.grab().await.unwrap().map(|f| f.width()), Some(1));
        assert!(handle.grab().await.unwrap().is_none());
        assert!(!released.load(Ordering::SeqCst));

        drop(handle);
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn open_failure_is_reported() {
        let opener: SourceOpener = Box::new(|| -> Result<Box<dyn FrameSource>> {
            Err(ScanError::CameraUnavailable("no device".into()))
        });

        match CaptureHandle::open(opener).await {
            Err(ScanError::CameraUnavailable(message)) => assert_eq!(message, "no device"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("open should fail"),
        }
    }
}
