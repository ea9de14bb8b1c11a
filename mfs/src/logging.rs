//! Diagnostic logging for the CLI.
//!
//! Logs go to stderr so that command output on stdout stays parseable.
//! `MFS_LOG` takes an `EnvFilter` directive (default `warn`), and
//! `MFS_LOG_FORMAT=json` switches to JSON lines.

use anyhow::{Result, bail};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "MFS_LOG";
const LOG_FORMAT_ENV: &str = "MFS_LOG_FORMAT";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Install the global subscriber.
///
/// `verbose` lowers the default level to `debug`; an explicit `MFS_LOG` wins.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = build_env_filter(verbose);
    let format = determine_format(std::env::var(LOG_FORMAT_ENV).ok().as_deref())?;

    let base_subscriber = Registry::default().with(filter);

    match format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose))
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "warn" })
}

fn determine_format(value: Option<&str>) -> Result<LogFormat> {
    match value {
        None | Some("") | Some("text") => Ok(LogFormat::Text),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => bail!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ),
    }
}
