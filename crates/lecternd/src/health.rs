//! Structured health reporting for host lifecycle events.

use std::sync::Arc;

use lectern_config::HostConfig;

use crate::bootstrap::BootstrapError;
use crate::transport::{SessionSummary, TransportError};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer for host lifecycle events.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes.
    fn bootstrap_succeeded(&self, config: &HostConfig);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the host starts reading requests.
    fn session_started(&self);

    /// Invoked after input closed and every queued request was answered.
    fn session_finished(&self, summary: &SessionSummary);

    /// Invoked when the session ended on an I/O failure.
    fn session_failed(&self, error: &TransportError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &HostConfig) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_started(&self) {
        (**self).session_started();
    }

    fn session_finished(&self, summary: &SessionSummary) {
        (**self).session_finished(summary);
    }

    fn session_failed(&self, error: &TransportError) {
        (**self).session_failed(error);
    }
}

/// Reporter that logs lifecycle events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(target: HEALTH_TARGET, event = "bootstrap_starting", "starting host bootstrap");
    }

    fn bootstrap_succeeded(&self, config: &HostConfig) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            log_filter = config.log_filter(),
            log_format = %config.log_format(),
            max_envelope_bytes = config.max_envelope_bytes(),
            "host bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(target: HEALTH_TARGET, event = "bootstrap_failed", %error, "host bootstrap failed");
    }

    fn session_started(&self) {
        tracing::info!(target: HEALTH_TARGET, event = "session_started", "reading requests from stdin");
    }

    fn session_finished(&self, summary: &SessionSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_finished",
            accepted = summary.accepted,
            rejected = summary.rejected,
            steps = summary.steps,
            "session finished"
        );
    }

    fn session_failed(&self, error: &TransportError) {
        tracing::error!(target: HEALTH_TARGET, event = "session_failed", %error, "session failed");
    }
}
