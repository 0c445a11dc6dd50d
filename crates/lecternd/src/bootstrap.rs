//! Host bootstrap orchestration.

use std::io::{self, BufRead, BufReader};
use std::sync::Arc;

use lectern_config::{HostConfig, HostConfigError};
use thiserror::Error;

use crate::dispatch::{Dispatcher, EnvelopeWriter, ReplySink};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{self, SessionSummary, TransportError};

/// Abstracts configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the host configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HostConfigError`] when flags or environment are invalid.
    fn load(&self) -> Result<HostConfig, HostConfigError>;
}

/// Loader reading the process arguments and environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<HostConfig, HostConfigError> {
        HostConfig::load()
    }
}

/// Loader returning a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: HostConfig,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<HostConfig, HostConfigError> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Loader error.
        #[source]
        source: HostConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// A bootstrapped host, ready to serve.
pub struct Host {
    config: HostConfig,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Host {
    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// The telemetry handle.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Creates a dispatcher honouring the configured envelope limit.
    pub fn dispatcher<S: ReplySink>(&self, sink: S) -> Dispatcher<S> {
        Dispatcher::new(sink).with_max_envelope_bytes(self.config.max_envelope_bytes())
    }

    /// Serves `input` through `dispatcher` until input closes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on read or write failure.
    pub fn serve<R, S>(
        &self,
        input: R,
        dispatcher: &mut Dispatcher<S>,
    ) -> Result<SessionSummary, TransportError>
    where
        R: BufRead + Send + 'static,
        S: ReplySink,
    {
        self.reporter.session_started();
        let result = transport::serve(input, dispatcher, self.config.max_envelope_bytes());
        match &result {
            Ok(summary) => self.reporter.session_finished(summary),
            Err(error) => self.reporter.session_failed(error),
        }
        result
    }

    /// Serves stdin, writing replies to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on read or write failure.
    pub fn serve_stdio(&self) -> Result<SessionSummary, TransportError> {
        let mut dispatcher = self.dispatcher(EnvelopeWriter::new(io::stdout()));
        self.serve(BufReader::new(io::stdin()), &mut dispatcher)
    }
}

/// Bootstraps the host using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] if configuration or telemetry fail; the
/// reporter is told before the error is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Host, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Host {
        config,
        telemetry,
        reporter,
    })
}
