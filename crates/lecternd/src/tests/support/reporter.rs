//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;

use lectern_config::HostConfig;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::transport::{SessionSummary, TransportError};

/// Lifecycle events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    SessionStarted,
    SessionFinished(SessionSummary),
    SessionFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &HostConfig) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_started(&self) {
        self.record(HealthEvent::SessionStarted);
    }

    fn session_finished(&self, summary: &SessionSummary) {
        self.record(HealthEvent::SessionFinished(*summary));
    }

    fn session_failed(&self, error: &TransportError) {
        self.record(HealthEvent::SessionFailed(error.to_string()));
    }
}
