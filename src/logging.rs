//! Logging configuration using tracing

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "OMNIWEB_LOG";

const DEFAULT_FILTER: &str = "omniweb_core=info,warn";

/// Install a stderr subscriber for the host process.
///
/// Log level is controlled by the `OMNIWEB_LOG` environment variable.
///
/// # Examples
/// ```bash
/// OMNIWEB_LOG=debug ./omniweb
/// OMNIWEB_LOG=omniweb_core::state=trace ./omniweb
/// ```
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    tracing::info!("OmniWeb core {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
