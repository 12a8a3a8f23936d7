use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Install a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_filter` (trace|debug|info|warn|error|off, or
/// any `EnvFilter` directive).
pub fn init_subscriber(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}
