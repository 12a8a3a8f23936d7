//! End-to-end tests: a recorded session replayed directly and through the
//! threaded analyzer must land the overlay in the same place.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glass_overlay::{
    detector_fn, read_observations, replay, AnalysisFrame, BitmapSize, EyePair, FrameAnalyzer,
    FrameDimensions, Observation, OverlayConfig, OverlayPlacer, Point, Rect, SharedOverlayPlacer,
    ViewportDimensions,
};

const VIEWPORT: ViewportDimensions = ViewportDimensions::new(1080.0, 1920.0);
const BITMAP: BitmapSize = BitmapSize::new(600.0, 220.0);

/// A short front-camera session: face found, lost for two frames, found again
/// with some jitter.
const SESSION: &str = r#"
# 480x640 sensor mounted at 90 degrees
{"eyes": null, "frame": {"width": 0, "height": 0}}
{"eyes": {"left": {"x": 200.0, "y": 320.0}, "right": {"x": 280.0, "y": 320.0}}, "frame": {"width": 480, "height": 640}}
{"eyes": {"left": {"x": 204.0, "y": 318.0}, "right": {"x": 284.0, "y": 318.0}}, "frame": {"width": 480, "height": 640}}
{"frame": {"width": 480, "height": 640}}
{"eyes": null, "frame": {"width": 480, "height": 640}}
{"eyes": {"left": {"x": 196.0, "y": 321.0}, "right": {"x": 276.0, "y": 321.0}}, "frame": {"width": 480, "height": 640, "rotation": 90}}
"#;

fn approx_rect(a: &Rect, b: &Rect) -> bool {
    (a.left - b.left).abs() < 1e-3
        && (a.top - b.top).abs() < 1e-3
        && (a.right - b.right).abs() < 1e-3
        && (a.bottom - b.bottom).abs() < 1e-3
}

#[test]
fn replayed_session_tracks_and_holds() {
    let observations = read_observations(Cursor::new(SESSION)).unwrap();
    assert_eq!(observations.len(), 6);

    let mut placer = OverlayPlacer::new(OverlayConfig::default(), VIEWPORT);
    let steps = replay(&observations, &mut placer, VIEWPORT, BITMAP);

    assert!(steps[0].placement.is_none());
    assert!(steps[1..].iter().all(|s| s.placement.is_some()));

    // dropouts keep the last placement
    assert_eq!(steps[3].placement, steps[2].placement);
    assert_eq!(steps[4].placement, steps[2].placement);

    // (200,320) -> (204,318) -> (196,321) on the left eye
    let smoothed = placer.smoothed().unwrap();
    assert_eq!(smoothed.left, Point::new(199.0, 320.0));
    assert_eq!(smoothed.right, Point::new(279.0, 320.0));

    // 80 px at scale.x = 1080 / 640
    let last = steps[5].placement.unwrap();
    assert!((last.eye_distance - 135.0).abs() < 1e-3);
    assert!((last.rect.width() - 540.0).abs() < 1e-3);
    assert!((last.rect.height() - 198.0).abs() < 1e-3);

    // mirrored: x' = 1080 - x * 1.6875, y' = y * 4
    let center_x = 1080.0 - (199.0 + 279.0) / 2.0 * 1.6875;
    assert!((last.center.x - center_x).abs() < 1e-3);
    assert!((last.center.y - 1280.0).abs() < 1e-3);
    // nudge of 0.2 * eye distance below the eye line
    assert!((last.rect.center().y - (1280.0 + 27.0)).abs() < 1e-3);
}

#[test]
fn analyzer_matches_direct_replay() {
    let observations = read_observations(Cursor::new(SESSION)).unwrap();

    let mut direct = OverlayPlacer::new(OverlayConfig::default(), VIEWPORT);
    replay(&observations, &mut direct, VIEWPORT, BITMAP);
    let expected = direct.current_placement(VIEWPORT, BITMAP).unwrap();

    let shared = SharedOverlayPlacer::new(OverlayPlacer::new(OverlayConfig::default(), VIEWPORT));
    let recorded: Vec<Observation> = observations.clone();
    let cursor = Arc::new(AtomicUsize::new(0));
    let detector_cursor = Arc::clone(&cursor);
    let analyzer = FrameAnalyzer::spawn(
        detector_fn(move |_frame| {
            let idx = detector_cursor.fetch_add(1, Ordering::SeqCst);
            Ok(recorded[idx].eyes)
        }),
        shared.clone(),
    )
    .unwrap();

    let releases = Arc::new(AtomicUsize::new(0));
    for observation in &observations {
        let releases = Arc::clone(&releases);
        let frame = AnalysisFrame::new(observation.frame, Vec::new()).on_release(move || {
            releases.fetch_add(1, Ordering::SeqCst);
        });
        analyzer.submit(frame).unwrap();
        analyzer.wait_idle();
    }

    let stats = analyzer.stats();
    assert_eq!(stats.analyzed, 3);
    assert_eq!(stats.without_face, 3);
    assert_eq!(stats.dropped, 0);
    assert_eq!(releases.load(Ordering::SeqCst), observations.len());

    let placement = shared.current_placement(VIEWPORT, BITMAP).unwrap();
    assert!(approx_rect(&placement.rect, &expected.rect));
}

#[test]
fn custom_tuning_changes_only_geometry() {
    let eyes = EyePair::new(Point::new(200.0, 320.0), Point::new(280.0, 320.0));
    let frame = FrameDimensions::new(480, 640);

    let mut standard = OverlayPlacer::new(OverlayConfig::default(), VIEWPORT);
    let mut narrow = OverlayPlacer::new(
        OverlayConfig {
            width_ratio: 2.0,
            ..OverlayConfig::default()
        },
        VIEWPORT,
    );
    standard.update(Some(eyes), frame);
    narrow.update(Some(eyes), frame);

    let a = standard.current_placement(VIEWPORT, BITMAP).unwrap();
    let b = narrow.current_placement(VIEWPORT, BITMAP).unwrap();
    assert_eq!(a.center, b.center);
    assert!((a.rect.width() - 2.0 * b.rect.width()).abs() < 1e-3);
}
