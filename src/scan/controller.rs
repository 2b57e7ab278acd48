use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{
    preview::FramePreview,
    session::{ScanOutcome, ScanSession},
    sink::{ScanSink, ScanStatus},
    state::ScanSnapshot,
};
use crate::{
    capture::{self, CaptureHandle, SourceOpener},
    decode::Decoder,
    error::ScanError,
    settings::Settings,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

struct RunningScan {
    ticker: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Owns the scan lifecycle: opens the frame source, drives the tick loop and
/// publishes every accepted change to the sink.
///
/// Snapshots are handed to the sink while the session lock is held, so the
/// sink sees them in the order the state changed.
#[derive(Clone)]
pub struct ScanController {
    session: Arc<Mutex<ScanSession>>,
    settings: Arc<Settings>,
    sink: Arc<dyn ScanSink>,
    running: Arc<Mutex<Option<RunningScan>>>,
}

impl ScanController {
    pub fn new(settings: Settings, decoder: Arc<dyn Decoder>, sink: Arc<dyn ScanSink>) -> Self {
        let session = ScanSession::new(decoder, settings.history_limit);
        Self {
            session: Arc::new(Mutex::new(session)),
            settings: Arc::new(settings),
            sink,
            running: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn snapshot(&self) -> ScanSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Start scanning from the configured source.
    pub async fn start(&self) -> Result<()> {
        self.start_with(capture::opener_for(&self.settings.source))
            .await
    }

    /// Start scanning from an explicit source. A source that fails to open is
    /// reported once through the sink and recorded in the snapshot; image
    /// scanning and reset keep working.
    pub async fn start_with(&self, opener: SourceOpener) -> Result<()> {
        let mut running = self.running.lock().await;
        match running.take() {
            Some(scan) if !scan.ticker.is_finished() => {
                *running = Some(scan);
                return Err(ScanError::AlreadyRunning.into());
            }
            // The loop ended on its own (capture thread died); reap it.
            Some(scan) => {
                if let Err(err) = scan.ticker.await {
                    log_error!("previous scan loop ended abnormally: {err}");
                }
            }
            None => {}
        }

        let capture = match CaptureHandle::open(opener).await {
            Ok(capture) => capture,
            Err(err) => {
                let message = err.to_string();
                warn!("Scanning not started: {message}");
                let mut session = self.session.lock().await;
                session.set_running(false);
                session.set_camera_error(Some(message.clone()));
                self.sink
                    .status(&ScanStatus::CameraUnavailable { message });
                self.sink.state_changed(&session.snapshot());
                return Err(err.into());
            }
        };

        {
            let mut session = self.session.lock().await;
            session.set_camera_error(None);
            session.set_running(true);
            self.sink.status(&ScanStatus::Started);
            self.sink.state_changed(&session.snapshot());
        }

        let cancel_token = CancellationToken::new();
        let ticker = tokio::spawn(scan_loop(
            self.session.clone(),
            self.sink.clone(),
            capture,
            cancel_token.clone(),
            self.settings.clone(),
        ));

        *running = Some(RunningScan {
            ticker,
            cancel_token,
        });

        info!(
            "Scanning started (tick every {}ms)",
            self.settings.tick_interval().as_millis()
        );
        Ok(())
    }

    /// Stop ticking and release the frame source. Returns once the last tick
    /// has finished, so nothing touches the session afterwards. Does nothing
    /// when idle.
    pub async fn stop(&self) -> Result<()> {
        let Some(scan) = self.running.lock().await.take() else {
            return Ok(());
        };

        scan.cancel_token.cancel();
        if let Err(err) = scan.ticker.await {
            // The loop never reached its own shutdown path.
            mark_stopped(&self.session, self.sink.as_ref()).await;
            return Err(anyhow!("scan loop task failed to join: {err}"));
        }
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|scan| !scan.ticker.is_finished())
    }

    pub async fn reset(&self) -> ScanSnapshot {
        let mut session = self.session.lock().await;
        session.reset();
        let snapshot = session.snapshot();
        self.sink.state_changed(&snapshot);
        snapshot
    }

    pub async fn scan_image(&self, path: PathBuf) -> Result<ScanOutcome> {
        self.scan_still(move |session| session.on_load_image(&path))
            .await
    }

    pub async fn scan_image_bytes(&self, bytes: Vec<u8>) -> Result<ScanOutcome> {
        self.scan_still(move |session| session.on_load_image_bytes(&bytes))
            .await
    }

    async fn scan_still<F>(&self, load: F) -> Result<ScanOutcome>
    where
        F: FnOnce(&mut ScanSession) -> crate::error::Result<ScanOutcome> + Send + 'static,
    {
        let session = self.session.clone();
        let sink = self.sink.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut session = session.blocking_lock();
            let outcome = load(&mut *session)?;
            if outcome.changed() {
                sink.state_changed(&session.snapshot());
            }
            Ok::<_, ScanError>(outcome)
        })
        .await
        .context("image scan worker join failed")??;

        Ok(outcome)
    }
}

async fn scan_loop(
    session: Arc<Mutex<ScanSession>>,
    sink: Arc<dyn ScanSink>,
    capture: CaptureHandle,
    cancel_token: CancellationToken,
    settings: Arc<Settings>,
) {
    let mut ticker = time::interval(settings.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A tick runs to completion before cancellation is checked again.
                match run_tick(&session, &sink, &capture, &settings).await {
                    Ok(()) => {}
                    Err(err) if matches!(err.downcast_ref::<ScanError>(), Some(ScanError::WorkerGone)) => {
                        log_error!("capture worker vanished, scan loop exiting");
                        break;
                    }
                    Err(err) => log_error!("scan tick failed: {err:?}"),
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("scan loop shutting down");
                break;
            }
        }
    }

    // Joining the capture thread blocks until the device is released.
    if let Err(err) = tokio::task::spawn_blocking(move || drop(capture)).await {
        log_error!("failed to release capture thread: {err}");
    }

    mark_stopped(&session, sink.as_ref()).await;
}

async fn mark_stopped(session: &Mutex<ScanSession>, sink: &dyn ScanSink) {
    let mut session = session.lock().await;
    session.set_running(false);
    sink.status(&ScanStatus::Stopped);
    sink.state_changed(&session.snapshot());
}

/// One tick: grab a frame, decode it and publish whatever changed.
///
/// Only the wait for a frame is bounded. A decode that has started is always
/// awaited, since its result is already applied to the session.
async fn run_tick(
    session: &Arc<Mutex<ScanSession>>,
    sink: &Arc<dyn ScanSink>,
    capture: &CaptureHandle,
    settings: &Settings,
) -> Result<()> {
    let timeout = settings.decode_timeout();
    let frame = match time::timeout(timeout, capture.grab()).await {
        Ok(grabbed) => grabbed?,
        Err(_) => {
            log_warn!("no frame within {}ms, skipping tick", timeout.as_millis());
            return Ok(());
        }
    };
    let Some(frame) = frame else {
        log_debug!("no frame this tick");
        return Ok(());
    };

    let session = Arc::clone(session);
    let sink = Arc::clone(sink);
    let preview_width = settings.preview_width;
    let mut decode = tokio::task::spawn_blocking(move || {
        let seen = {
            let mut session = session.blocking_lock();
            let before = session.state().revision();
            let scan = session.scan_frame(&frame);
            if session.state().revision() != before {
                sink.state_changed(&session.snapshot());
            }
            scan.seen
        };

        if sink.wants_preview() {
            match FramePreview::render(&frame, &seen, preview_width) {
                Ok(preview) => sink.preview(&preview),
                Err(err) => log_warn!("preview dropped: {err}"),
            }
        }
    });

    let joined = match time::timeout(timeout, &mut decode).await {
        Ok(joined) => joined,
        Err(_) => {
            log_warn!(
                "decode is taking longer than {}ms, waiting for it",
                timeout.as_millis()
            );
            decode.await
        }
    };
    joined.map_err(|err| anyhow!("decode worker join failed: {err}"))
}
