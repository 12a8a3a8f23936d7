//! # glass-overlay
//!
//! Eye-landmark smoothing and eyeglasses overlay placement for live camera
//! previews.
//!
//! This crate provides:
//! - **Smoothing**: an exponential low-pass filter over the two eye landmarks
//!   reported by a face detector, to suppress frame-to-frame jitter
//! - **Placement**: mapping the smoothed eyes from sensor space onto the
//!   viewport (axis swap for rotated sensors, horizontal mirror for the front
//!   camera) and sizing the overlay bitmap from the inter-eye distance
//! - **Frame analysis**: a worker thread that runs an external detector with
//!   keep-latest backpressure and releases every camera frame it is given
//!
//! Face detection, camera capture and bitmap compositing are left to the
//! caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use glass_overlay::{
//!     BitmapSize, EyePair, FrameDimensions, OverlayConfig, OverlayPlacer, Point,
//!     ViewportDimensions,
//! };
//!
//! let viewport = ViewportDimensions::new(1080.0, 1920.0);
//! let mut placer = OverlayPlacer::new(OverlayConfig::default(), viewport);
//!
//! // Nothing to draw until the detector reports a face
//! let bitmap = BitmapSize::new(600.0, 220.0);
//! assert!(placer.current_placement(viewport, bitmap).is_none());
//!
//! // Per analyzed frame
//! let eyes = EyePair::new(Point::new(210.0, 300.0), Point::new(290.0, 300.0));
//! placer.update(Some(eyes), FrameDimensions::new(480, 640));
//!
//! // Per draw
//! let placement = placer.current_placement(viewport, bitmap).unwrap();
//! println!("draw glasses into {:?}", placement.rect);
//! ```
//!
//! ## Threads
//!
//! When detection runs off the render thread, share the placer through
//! [`SharedOverlayPlacer`] and drive it with a [`FrameAnalyzer`]:
//!
//! ```rust
//! use glass_overlay::{
//!     detector_fn, AnalysisFrame, EyePair, FrameAnalyzer, FrameDimensions, OverlayConfig,
//!     OverlayPlacer, Point, SharedOverlayPlacer, ViewportDimensions,
//! };
//!
//! let viewport = ViewportDimensions::new(1080.0, 1920.0);
//! let placer = SharedOverlayPlacer::new(OverlayPlacer::new(OverlayConfig::default(), viewport));
//!
//! let detector = detector_fn(|_frame: &AnalysisFrame| {
//!     Ok(Some(EyePair::new(Point::new(210.0, 300.0), Point::new(290.0, 300.0))))
//! });
//! let analyzer = FrameAnalyzer::spawn(detector, placer.clone()).unwrap();
//!
//! analyzer
//!     .submit(AnalysisFrame::new(FrameDimensions::new(480, 640), Vec::new()))
//!     .unwrap();
//! analyzer.wait_idle();
//! assert!(placer.smoothed().is_some());
//! ```

pub mod config;
mod error;
pub mod logging;
pub mod pipeline;
pub mod placement;
pub mod replay;
pub mod shared;
pub mod smoothing;
mod types;

pub use self::config::OverlayConfig;
pub use error::{Error, Result};
pub use pipeline::{
    detector_fn, AnalysisFrame, AnalyzerStats, DetectorFn, FrameAnalyzer, LandmarkDetector,
};
pub use placement::{place_between, AxisScale, OverlayPlacer, Placement};
pub use replay::{read_observations, replay, Observation, ReplayStep};
pub use shared::SharedOverlayPlacer;
pub use smoothing::EyeSmoother;
pub use types::{
    BitmapSize, EyePair, FrameDimensions, Point, Rect, Rotation, ViewportDimensions,
};
