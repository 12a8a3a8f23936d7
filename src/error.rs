use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed observation on line {line}: {source}")]
    Observation {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported rotation: {0} degrees (expected 0, 90, 180 or 270)")]
    InvalidRotation(u32),

    #[error("Landmark detection failed: {0}")]
    Detector(String),

    #[error("Frame analyzer is shut down")]
    AnalyzerClosed,

    #[error("Failed to install log subscriber: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
