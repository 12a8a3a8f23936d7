//! Frame analysis on a dedicated worker thread.
//!
//! Camera frames arrive faster than landmark detection can keep up with, so
//! the analyzer holds at most one waiting frame. A newer frame replaces the
//! waiting one ("keep latest"); the replaced frame is released immediately.
//!
//! Frames come from a bounded pool owned by the camera. [`AnalysisFrame`]
//! returns its buffer through a release hook when dropped, so every frame is
//! released whether detection succeeds, finds nothing, fails or panics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};
use crate::shared::SharedOverlayPlacer;
use crate::types::{EyePair, FrameDimensions};

type ReleaseHook = Box<dyn FnOnce() + Send + 'static>;

/// One camera frame handed to the detector.
pub struct AnalysisFrame {
    dimensions: FrameDimensions,
    pixels: Vec<u8>,
    release: Option<ReleaseHook>,
}

impl AnalysisFrame {
    pub fn new(dimensions: FrameDimensions, pixels: Vec<u8>) -> Self {
        Self {
            dimensions,
            pixels,
            release: None,
        }
    }

    /// Run `hook` exactly once when this frame is dropped.
    pub fn on_release<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.release = Some(Box::new(hook));
        self
    }

    pub fn dimensions(&self) -> FrameDimensions {
        self.dimensions
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl std::fmt::Debug for AnalysisFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisFrame")
            .field("dimensions", &self.dimensions)
            .field("pixels", &self.pixels.len())
            .finish()
    }
}

impl Drop for AnalysisFrame {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// External face-landmark detector.
///
/// Returns `Ok(None)` when no face, or a face without both eye landmarks, was
/// found. Errors are logged by the analyzer and otherwise treated like
/// `Ok(None)`.
pub trait LandmarkDetector: Send + 'static {
    fn detect(&mut self, frame: &AnalysisFrame) -> Result<Option<EyePair>>;
}

/// Detector backed by a closure. See [`detector_fn`].
pub struct DetectorFn<F>(F);

/// Wrap a closure as a [`LandmarkDetector`].
pub fn detector_fn<F>(f: F) -> DetectorFn<F>
where
    F: FnMut(&AnalysisFrame) -> Result<Option<EyePair>> + Send + 'static,
{
    DetectorFn(f)
}

impl<F> LandmarkDetector for DetectorFn<F>
where
    F: FnMut(&AnalysisFrame) -> Result<Option<EyePair>> + Send + 'static,
{
    fn detect(&mut self, frame: &AnalysisFrame) -> Result<Option<EyePair>> {
        (self.0)(frame)
    }
}

/// Frame counts since the analyzer started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzerStats {
    /// Frames whose eyes were passed to the placer.
    pub analyzed: u64,
    /// Frames where the detector found no usable face.
    pub without_face: u64,
    /// Frames where the detector returned an error.
    pub failed: u64,
    /// Frames replaced by a newer one before analysis.
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    analyzed: AtomicU64,
    without_face: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> AnalyzerStats {
        AnalyzerStats {
            analyzed: self.analyzed.load(Ordering::Relaxed),
            without_face: self.without_face.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Default)]
struct Slot {
    pending: Option<AnalysisFrame>,
    busy: bool,
    closed: bool,
}

#[derive(Default)]
struct Inbox {
    slot: Mutex<Slot>,
    changed: Condvar,
}

/// Runs a [`LandmarkDetector`] on its own thread and feeds the results into a
/// [`SharedOverlayPlacer`], one frame at a time.
pub struct FrameAnalyzer {
    inbox: Arc<Inbox>,
    counters: Arc<Counters>,
    thread: Option<thread::JoinHandle<()>>,
}

impl FrameAnalyzer {
    pub fn spawn<D: LandmarkDetector>(detector: D, placer: SharedOverlayPlacer) -> Result<Self> {
        let inbox = Arc::new(Inbox::default());
        let counters = Arc::new(Counters::default());

        let thread = {
            let inbox = Arc::clone(&inbox);
            let counters = Arc::clone(&counters);
            thread::Builder::new()
                .name("frame-analyzer".into())
                .spawn(move || run(detector, placer, &inbox, &counters))?
        };
        tracing::info!("frame analyzer started");

        Ok(Self {
            inbox,
            counters,
            thread: Some(thread),
        })
    }

    /// Queue a frame for analysis, replacing any frame still waiting.
    pub fn submit(&self, frame: AnalysisFrame) -> Result<()> {
        let stale = {
            let mut slot = self.inbox.slot.lock();
            if slot.closed {
                return Err(Error::AnalyzerClosed);
            }
            slot.pending.replace(frame)
        };
        self.inbox.changed.notify_all();

        if let Some(stale) = stale {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(dimensions = ?stale.dimensions(), "dropping stale frame");
        }
        Ok(())
    }

    /// Block until no frame is waiting or being analyzed.
    pub fn wait_idle(&self) {
        let mut slot = self.inbox.slot.lock();
        while !slot.closed && (slot.pending.is_some() || slot.busy) {
            self.inbox.changed.wait(&mut slot);
        }
    }

    pub fn stats(&self) -> AnalyzerStats {
        self.counters.snapshot()
    }
}

impl Drop for FrameAnalyzer {
    fn drop(&mut self) {
        let pending = {
            let mut slot = self.inbox.slot.lock();
            slot.closed = true;
            slot.pending.take()
        };
        drop(pending);
        self.inbox.changed.notify_all();

        tracing::info!("shutting down frame analyzer");
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("frame analyzer thread panicked");
            }
        }
    }
}

/// Closes the inbox when the worker exits, including when a detector panic
/// unwinds through [`run`]. Later submits fail and waiters wake up.
struct CloseOnExit<'a>(&'a Inbox);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::error!("landmark detector panicked, closing frame analyzer");
        }
        let pending = {
            let mut slot = self.0.slot.lock();
            slot.closed = true;
            slot.busy = false;
            slot.pending.take()
        };
        drop(pending);
        self.0.changed.notify_all();
    }
}

fn run<D: LandmarkDetector>(
    mut detector: D,
    placer: SharedOverlayPlacer,
    inbox: &Inbox,
    counters: &Counters,
) {
    let _close = CloseOnExit(inbox);
    loop {
        let frame = {
            let mut slot = inbox.slot.lock();
            loop {
                if slot.closed {
                    return;
                }
                if let Some(frame) = slot.pending.take() {
                    slot.busy = true;
                    break frame;
                }
                inbox.changed.wait(&mut slot);
            }
        };

        analyze(&mut detector, &placer, frame, counters);

        inbox.slot.lock().busy = false;
        inbox.changed.notify_all();
    }
}

fn analyze<D: LandmarkDetector>(
    detector: &mut D,
    placer: &SharedOverlayPlacer,
    frame: AnalysisFrame,
    counters: &Counters,
) {
    match detector.detect(&frame) {
        Ok(Some(eyes)) => {
            placer.update(Some(eyes), frame.dimensions());
            counters.analyzed.fetch_add(1, Ordering::Relaxed);
        }
        Ok(None) => {
            tracing::trace!("no face in frame");
            counters.without_face.fetch_add(1, Ordering::Relaxed);
        }
        Err(err) => {
            tracing::warn!(error = %err, "landmark detection failed");
            counters.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}
