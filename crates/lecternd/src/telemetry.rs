//! Structured telemetry for the analysis host.
//!
//! Stdout carries the envelope protocol, so every log line goes to stderr.

use std::io::{self, IsTerminal};

use lectern_config::{HostConfig, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Proof that the global subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The log filter expression did not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Rejected expression.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// Another subscriber was already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on first use.
///
/// Later calls return a handle without touching global state, even if their
/// configuration differs.
///
/// # Examples
///
/// ```rust
/// use lectern_config::HostConfig;
/// use lecternd::telemetry;
///
/// # fn main() -> Result<(), lecternd::telemetry::TelemetryError> {
/// let config = HostConfig::default();
/// telemetry::initialise(&config)?;
/// telemetry::initialise(&config)?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError`] if the filter is invalid or another subscriber
/// owns the global slot.
pub fn initialise(config: &HostConfig) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

/// Parses the configured filter expression.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] naming the rejected expression.
pub fn log_filter(config: &HostConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        filter: config.log_filter().to_owned(),
        message: error.to_string(),
    })
}

fn install_subscriber(config: &HostConfig) -> Result<(), TelemetryError> {
    let filter = log_filter(config)?;
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let config = HostConfig::default().with_log_filter("lecternd=[");
        let error = log_filter(&config).expect_err("filter should fail");
        assert!(matches!(error, TelemetryError::Filter { ref filter, .. } if filter == "lecternd=["));
    }

    #[test]
    fn accepts_target_directives() {
        let config = HostConfig::default().with_log_filter("info,lecternd::cache=debug");
        assert!(log_filter(&config).is_ok());
    }
}
