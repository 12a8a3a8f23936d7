//! Replaying recorded detector output through an [`OverlayPlacer`].
//!
//! Recordings are JSON lines, one observation per analyzed frame:
//!
//! ```text
//! # comments and blank lines are skipped
//! {"eyes": {"left": {"x": 210.0, "y": 300.5}, "right": {"x": 290.0, "y": 302.0}}, "frame": {"width": 480, "height": 640}}
//! {"eyes": null, "frame": {"width": 480, "height": 640, "rotation": 90}}
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::placement::{OverlayPlacer, Placement};
use crate::types::{BitmapSize, EyePair, FrameDimensions, ViewportDimensions};

/// Detector output for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub eyes: Option<EyePair>,
    pub frame: FrameDimensions,
}

/// Placement after feeding one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplayStep {
    /// Zero-based position of the observation in the recording.
    pub index: usize,
    pub detected: bool,
    pub placement: Option<Placement>,
}

pub fn read_observations<R: BufRead>(reader: R) -> Result<Vec<Observation>> {
    let mut observations = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let observation = serde_json::from_str(trimmed).map_err(|source| Error::Observation {
            line: idx + 1,
            source,
        })?;
        observations.push(observation);
    }
    Ok(observations)
}

/// Feed every observation to `placer` in order, recording the placement a
/// renderer would draw after each one.
pub fn replay(
    observations: &[Observation],
    placer: &mut OverlayPlacer,
    viewport: ViewportDimensions,
    bitmap: BitmapSize,
) -> Vec<ReplayStep> {
    observations
        .iter()
        .enumerate()
        .map(|(index, observation)| {
            placer.update(observation.eyes, observation.frame);
            ReplayStep {
                index,
                detected: observation.eyes.is_some(),
                placement: placer.current_placement(viewport, bitmap),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::config::OverlayConfig;
    use crate::types::{Point, Rotation};

    #[test]
    fn parses_lines_and_skips_comments() {
        let input = r#"
# session 1
{"eyes": {"left": {"x": 1.0, "y": 2.0}, "right": {"x": 3.0, "y": 4.0}}, "frame": {"width": 480, "height": 640}}

{"eyes": null, "frame": {"width": 480, "height": 640, "rotation": 0}}
{"frame": {"width": 0, "height": 0}}
"#;
        let observations = read_observations(Cursor::new(input)).unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(
            observations[0].eyes,
            Some(EyePair::new(Point::new(1.0, 2.0), Point::new(3.0, 4.0)))
        );
        assert_eq!(observations[0].frame.rotation, Rotation::Deg90);
        assert_eq!(observations[1].eyes, None);
        assert_eq!(observations[1].frame.rotation, Rotation::Deg0);
        assert!(observations[2].frame.is_empty());
    }

    #[test]
    fn reports_the_offending_line() {
        let input = "{\"frame\": {\"width\": 1, \"height\": 1}}\n\n{\"frame\": 12}\n";
        let err = read_observations(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, Error::Observation { line: 3, .. }));
    }

    #[test]
    fn replay_holds_last_placement_through_dropouts() {
        let observations = vec![
            Observation {
                eyes: None,
                frame: FrameDimensions::new(480, 640),
            },
            Observation {
                eyes: Some(EyePair::new(Point::new(200.0, 300.0), Point::new(280.0, 300.0))),
                frame: FrameDimensions::new(480, 640),
            },
            Observation {
                eyes: None,
                frame: FrameDimensions::new(480, 640),
            },
        ];
        let viewport = ViewportDimensions::new(1080.0, 1920.0);
        let mut placer = OverlayPlacer::new(OverlayConfig::default(), viewport);

        let steps = replay(&observations, &mut placer, viewport, BitmapSize::new(200.0, 80.0));

        assert_eq!(steps.len(), 3);
        assert!(steps[0].placement.is_none());
        assert!(steps[1].detected);
        assert!(steps[1].placement.is_some());
        assert!(!steps[2].detected);
        assert_eq!(steps[2].placement, steps[1].placement);
    }
}
