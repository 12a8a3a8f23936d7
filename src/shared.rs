use std::sync::Arc;

use parking_lot::Mutex;

use crate::placement::{AxisScale, OverlayPlacer, Placement};
use crate::types::{BitmapSize, EyePair, FrameDimensions, ViewportDimensions};

/// A cloneable handle to one [`OverlayPlacer`] shared between the frame
/// analysis thread (writer) and the render thread (reader).
///
/// Every call holds the lock for its whole duration, so a reader never sees
/// a left eye from one frame paired with a right eye from another.
#[derive(Debug, Clone)]
pub struct SharedOverlayPlacer {
    inner: Arc<Mutex<OverlayPlacer>>,
}

impl SharedOverlayPlacer {
    pub fn new(placer: OverlayPlacer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(placer)),
        }
    }

    pub fn update(&self, eyes: Option<EyePair>, frame: FrameDimensions) {
        self.inner.lock().update(eyes, frame);
    }

    pub fn current_placement(
        &self,
        viewport: ViewportDimensions,
        bitmap: BitmapSize,
    ) -> Option<Placement> {
        self.inner.lock().current_placement(viewport, bitmap)
    }

    pub fn resize(&self, viewport: ViewportDimensions) {
        self.inner.lock().resize(viewport);
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn smoothed(&self) -> Option<EyePair> {
        self.inner.lock().smoothed()
    }

    pub fn scale(&self) -> AxisScale {
        self.inner.lock().scale()
    }

    /// Copy of the placer's full state at one instant.
    pub fn snapshot(&self) -> OverlayPlacer {
        self.inner.lock().clone()
    }
}

impl From<OverlayPlacer> for SharedOverlayPlacer {
    fn from(placer: OverlayPlacer) -> Self {
        Self::new(placer)
    }
}
