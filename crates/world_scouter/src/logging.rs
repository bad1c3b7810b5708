//! Logging setup.
//!
//! The scouter only emits `tracing` events. Hosts that already install a
//! subscriber can skip this module; standalone harnesses call
//! [`setup_logging`] once at startup.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Initialize the logging system.
///
/// Installs a global tracing subscriber at the configured level, writing
/// either plain text or JSON lines.
///
/// # Arguments
/// * `settings` - Level and output format from the `[logging]` table
///
/// # Returns
/// * `Result<()>` - Fails instead of panicking if a global subscriber is
///   already installed
///
/// # Environment Variables
/// * `RUST_LOG` - Overrides the configured level (e.g., "debug", "world_scouter=trace")
///
/// # Examples
/// ```no_run
/// use world_scouter::config::LoggingSettings;
/// use world_scouter::logging::setup_logging;
///
/// setup_logging(&LoggingSettings::default())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn setup_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if settings.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}
