//! Host process configuration resolved from flags and environment.
//!
//! Precedence is command-line flag, then `LECTERN_*` environment variable,
//! then built-in default.

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;

use crate::defaults::{DEFAULT_LOG_FILTER, DEFAULT_MAX_ENVELOPE_BYTES, MIN_MAX_ENVELOPE_BYTES};
use crate::logging::LogFormat;

/// Errors raised while resolving host configuration.
#[derive(Debug, Clone, Error)]
pub enum HostConfigError {
    /// Flags or environment values could not be parsed.
    #[error("invalid host configuration: {0}")]
    Arguments(#[source] Arc<clap::Error>),
}

impl HostConfigError {
    /// Returns the underlying parser error, which knows how to print help
    /// and version requests.
    #[must_use]
    pub fn parser_error(&self) -> &clap::Error {
        match self {
            Self::Arguments(error) => error,
        }
    }
}

/// Configuration for the analysis host process.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "lecternd",
    version,
    about = "Isolated analysis host speaking JSONL envelopes over stdio"
)]
pub struct HostConfig {
    /// Tracing filter expression, for example `info` or `lecternd=debug`.
    #[arg(long, env = "LECTERN_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,

    /// Log output format written to stderr.
    #[arg(long, env = "LECTERN_LOG_FORMAT", default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Largest accepted inbound envelope line, in bytes.
    #[arg(
        long,
        env = "LECTERN_MAX_ENVELOPE_BYTES",
        default_value_t = DEFAULT_MAX_ENVELOPE_BYTES,
        value_parser = parse_envelope_limit
    )]
    max_envelope_bytes: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: LogFormat::Json,
            max_envelope_bytes: DEFAULT_MAX_ENVELOPE_BYTES,
        }
    }
}

impl HostConfig {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`HostConfigError::Arguments`] when a flag or environment
    /// value is invalid, or when help or version output was requested.
    pub fn load() -> Result<Self, HostConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`HostConfigError::Arguments`] when a flag or environment
    /// value is invalid.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, HostConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|error| HostConfigError::Arguments(Arc::new(error)))
    }

    /// Returns a copy with a different log filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Returns a copy with a different log format.
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Largest accepted inbound envelope line, in bytes.
    #[must_use]
    pub fn max_envelope_bytes(&self) -> usize {
        self.max_envelope_bytes
    }
}

fn parse_envelope_limit(value: &str) -> Result<usize, String> {
    let limit: usize = value
        .trim()
        .parse()
        .map_err(|error| format!("'{value}' is not a byte count: {error}"))?;
    if limit < MIN_MAX_ENVELOPE_BYTES {
        return Err(format!(
            "envelope limit must be at least {MIN_MAX_ENVELOPE_BYTES} bytes, got {limit}"
        ));
    }
    Ok(limit)
}
