//! Configuration for the lectern analysis host.
//!
//! Two layers live here. [`HostConfig`] is resolved once at start-up from
//! command-line flags and `LECTERN_*` environment variables and controls the
//! process itself: logging and envelope limits. [`Configuration`] is the
//! analysis configuration the controlling process sends through `initialize`
//! requests; [`ConfigurationUpdate`] reads those payloads leniently and
//! [`Configuration::plan`] reports which pipelines an update invalidates.

pub mod analysis;
pub mod defaults;
pub mod host;
pub mod logging;

pub use analysis::{
    AFFECTS_READABILITY, AFFECTS_SEO, ConfigField, Configuration, ConfigurationUpdate, RebuildPlan,
};
pub use defaults::{
    DEFAULT_LOCALE, DEFAULT_LOG_FILTER, DEFAULT_MAX_ENVELOPE_BYTES, MIN_MAX_ENVELOPE_BYTES,
    default_log_filter, default_log_format,
};
pub use host::{HostConfig, HostConfigError};
pub use logging::{LogFormat, LogFormatParseError};
