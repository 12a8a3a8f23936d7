//! Mapping smoothed eye landmarks to an overlay rectangle.
//!
//! Detectors report landmarks in upright image coordinates, but frame
//! dimensions arrive as the sensor delivers them. For the usual front camera
//! the sensor is mounted at 90 degrees and the preview is mirrored, so mapping
//! a landmark to the screen involves:
//!
//! 1. Scaling each axis by `viewport / upright frame size` (width and height
//!    cross over for 90 and 270 degree sensors)
//! 2. Flipping horizontally: `x' = viewport.width - x * scale.x`
//!
//! Only step 1 depends on the rotation. The landmarks are already upright, so
//! the mirror and the vertical mapping are the same for every rotation.
//!
//! The overlay is then sized from the inter-eye distance and centred between
//! the eyes, with a small vertical nudge to account for padding in the artwork.

use serde::Serialize;

use crate::config::OverlayConfig;
use crate::smoothing::EyeSmoother;
use crate::types::{BitmapSize, EyePair, FrameDimensions, Point, Rect, ViewportDimensions};

/// Per-axis scale from detector pixels to viewport units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisScale {
    pub x: f32,
    pub y: f32,
}

impl Default for AxisScale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl AxisScale {
    /// Scale that stretches the upright frame to fill the viewport.
    pub fn fit(frame: &FrameDimensions, viewport: &ViewportDimensions) -> Option<Self> {
        if frame.is_empty() {
            return None;
        }
        let (horizontal, vertical) = frame.upright_size();
        Some(Self {
            x: viewport.width / horizontal as f32,
            y: viewport.height / vertical as f32,
        })
    }
}

/// Where to draw the overlay bitmap for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub rect: Rect,
    /// Midpoint between the mapped eyes.
    pub center: Point,
    /// Inter-eye distance in viewport units.
    pub eye_distance: f32,
}

/// Size and position the overlay between two eye points that are already in
/// viewport coordinates.
pub fn place_between(
    left: Point,
    right: Point,
    bitmap: BitmapSize,
    config: &OverlayConfig,
) -> Placement {
    let center = left.midpoint(&right);
    let eye_distance = left.distance(&right);

    let overlay_width = eye_distance * config.width_ratio;
    let scale_factor = overlay_width / bitmap.width;
    let overlay_height = bitmap.height * scale_factor;

    let vertical_nudge = eye_distance * config.vertical_nudge_ratio;

    let left_edge = center.x - overlay_width / 2.0;
    let top_edge = center.y - overlay_height / 2.0 - vertical_nudge;

    Placement {
        rect: Rect::new(
            left_edge,
            top_edge,
            left_edge + overlay_width,
            top_edge + overlay_height,
        ),
        center,
        eye_distance,
    }
}

/// Turns noisy per-frame eye detections into a stable overlay rectangle.
///
/// The placer is either uninitialized (no sample yet) or tracking. It moves to
/// tracking on the first valid update and stays there until [`reset`].
///
/// This type is not synchronized. Use
/// [`SharedOverlayPlacer`](crate::shared::SharedOverlayPlacer) when the
/// detector and the renderer run on different threads.
///
/// [`reset`]: OverlayPlacer::reset
#[derive(Debug, Clone)]
pub struct OverlayPlacer {
    config: OverlayConfig,
    smoother: EyeSmoother,
    viewport: ViewportDimensions,
    scale: AxisScale,
}

impl OverlayPlacer {
    pub fn new(config: OverlayConfig, viewport: ViewportDimensions) -> Self {
        Self {
            smoother: EyeSmoother::new(config.alpha),
            config,
            viewport,
            scale: AxisScale::default(),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn viewport(&self) -> ViewportDimensions {
        self.viewport
    }

    /// Record a new viewport size. Takes effect on the next frame that
    /// carries valid dimensions.
    pub fn resize(&mut self, viewport: ViewportDimensions) {
        self.viewport = viewport;
    }

    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    pub fn smoothed(&self) -> Option<EyePair> {
        self.smoother.current()
    }

    pub fn is_tracking(&self) -> bool {
        self.smoother.current().is_some()
    }

    /// Feed one analyzed frame.
    ///
    /// `None` means the detector found no usable face; nothing changes and the
    /// previous placement stays visible. A frame with a zero dimension still
    /// updates the eyes but keeps the previous scale.
    pub fn update(&mut self, eyes: Option<EyePair>, frame: FrameDimensions) {
        let Some(eyes) = eyes else {
            return;
        };

        if !self.is_tracking() {
            tracing::debug!(?eyes, "eye tracking started");
        }
        let smoothed = self.smoother.observe(eyes);

        if let Some(scale) = AxisScale::fit(&frame, &self.viewport) {
            self.scale = scale;
        }

        tracing::trace!(?smoothed, scale = ?self.scale, "eye landmarks updated");
    }

    /// Map a detector-space point onto the viewport, mirrored horizontally.
    pub fn map_to_viewport(&self, point: Point, viewport: &ViewportDimensions) -> Point {
        Point::new(
            viewport.width - point.x * self.scale.x,
            point.y * self.scale.y,
        )
    }

    /// The rectangle to draw the bitmap into, or `None` if no eyes have been
    /// seen yet.
    pub fn current_placement(
        &self,
        viewport: ViewportDimensions,
        bitmap: BitmapSize,
    ) -> Option<Placement> {
        let eyes = self.smoother.current()?;
        let left = self.map_to_viewport(eyes.left, &viewport);
        let right = self.map_to_viewport(eyes.right, &viewport);
        Some(place_between(left, right, bitmap, &self.config))
    }

    /// Start a new session: drop the smoothed estimate and cached scale.
    pub fn reset(&mut self) {
        tracing::debug!("eye tracking reset");
        self.smoother.reset();
        self.scale = AxisScale::default();
    }
}
