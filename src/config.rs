//! Tuning constants for smoothing and overlay geometry.
//!
//! The defaults were tuned by eye against the bundled eyeglasses artwork.
//! They can be overridden by a JSON file and then by `GLASS_OVERLAY_*`
//! environment variables.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Weight of the previous estimate in the exponential filter.
pub const DEFAULT_ALPHA: f32 = 0.5;

/// Overlay width as a multiple of the inter-eye distance.
pub const DEFAULT_WIDTH_RATIO: f32 = 4.0;

/// Vertical offset as a multiple of the inter-eye distance.
/// Negative values move the overlay down from the eye line.
pub const DEFAULT_VERTICAL_NUDGE_RATIO: f32 = -0.20;

const ENV_PREFIX: &str = "GLASS_OVERLAY";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub alpha: f32,
    pub width_ratio: f32,
    pub vertical_nudge_ratio: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            width_ratio: DEFAULT_WIDTH_RATIO,
            vertical_nudge_ratio: DEFAULT_VERTICAL_NUDGE_RATIO,
        }
    }
}

impl OverlayConfig {
    /// Load the configuration, layering defaults, the optional JSON file at
    /// `path`, and the environment. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_contents = match path {
            Some(path) => match fs::read_to_string(path) {
                Ok(contents) => Some(contents),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "config file not found, using defaults");
                    None
                }
                Err(err) => return Err(err.into()),
            },
            None => None,
        };

        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("alpha", f64::from(defaults.alpha))?
            .set_default("width_ratio", f64::from(defaults.width_ratio))?
            .set_default(
                "vertical_nudge_ratio",
                f64::from(defaults.vertical_nudge_ratio),
            )?;

        if let Some(contents) = &file_contents {
            builder = builder.add_source(config::File::from_str(
                contents,
                config::FileFormat::Json,
            ));
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(Error::InvalidConfig(format!(
                "alpha must be in [0, 1), got {}",
                self.alpha
            )));
        }
        if !self.width_ratio.is_finite() || self.width_ratio <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "width_ratio must be positive, got {}",
                self.width_ratio
            )));
        }
        if !self.vertical_nudge_ratio.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "vertical_nudge_ratio must be finite, got {}",
                self.vertical_nudge_ratio
            )));
        }
        Ok(())
    }
}
