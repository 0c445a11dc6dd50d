//! Default values shared by the host binary and its tests.

use crate::logging::LogFormat;

/// Default log filter expression used by the host.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default upper bound for a single inbound envelope line, in bytes.
pub const DEFAULT_MAX_ENVELOPE_BYTES: usize = 1024 * 1024;

/// Smallest envelope limit the host accepts.
pub const MIN_MAX_ENVELOPE_BYTES: usize = 1024;

/// Locale assumed until a configuration or document says otherwise.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Default log filter expression used by the host.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the host.
///
/// JSON keeps stderr machine-readable for the controlling process.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
