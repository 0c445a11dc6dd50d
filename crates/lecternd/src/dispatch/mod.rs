//! Request dispatch for the analysis host.
//!
//! The [`Dispatcher`] receives decoded envelopes, resolves their type to a
//! [`JobKind`], and hands the resulting job to the [`Scheduler`]. Unknown
//! types never become jobs: they are protocol errors, logged and dropped
//! without a reply. Replies are composed by the engine once a job's outcome
//! is known and leave through a [`ReplySink`].

mod analyze;
mod engine;
mod errors;
mod plugin_api;
mod response;

use lectern_config::{Configuration, DEFAULT_MAX_ENVELOPE_BYTES};
use lectern_plugins::{Paper, PluginRegistry};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::ResultCache;
use crate::codec::{Envelope, decode_envelope};
use crate::pipeline::{PipelineFactory, Pipelines, RuleCatalog};
use crate::research::Researcher;
use crate::scheduler::{Job, JobKind, Scheduler};
use crate::scripts::{BundleLoader, ScriptLoader};

use self::engine::Engine;

pub use self::analyze::{AnalyzeRequest, RelatedKeyword};
pub use self::errors::{DispatchError, JobError};
pub use self::plugin_api::PluginApi;
pub use self::response::{EnvelopeWriter, ReplySink};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Façade tying the codec, scheduler and engine together.
///
/// # Example
///
/// ```
/// use lecternd::dispatch::Dispatcher;
/// use lecternd::codec::Envelope;
///
/// let mut dispatcher = Dispatcher::new(Vec::<Envelope>::new());
/// dispatcher
///     .handle_message(br#"{"type":"initialize","id":1,"payload":{}}"#)
///     .expect("initialize accepted");
/// dispatcher.run_until_idle().expect("replies written");
/// assert_eq!(dispatcher.sink()[0].kind, "initialize:done");
/// ```
pub struct Dispatcher<S> {
    scheduler: Scheduler,
    engine: Engine<S>,
    max_envelope_bytes: usize,
}

impl<S: ReplySink> Dispatcher<S> {
    /// Creates a dispatcher with the built-in rules, researches and no script
    /// bundles.
    pub fn new(sink: S) -> Self {
        Self {
            scheduler: Scheduler::new(),
            engine: Engine::new(
                sink,
                Box::new(RuleCatalog::standard()),
                Researcher::standard(),
                Box::new(BundleLoader::new()),
            ),
            max_envelope_bytes: DEFAULT_MAX_ENVELOPE_BYTES,
        }
    }

    /// Replaces the pipeline factory.
    #[must_use]
    pub fn with_factory(mut self, factory: impl PipelineFactory + 'static) -> Self {
        self.engine.set_factory(Box::new(factory));
        self
    }

    /// Replaces the researcher.
    #[must_use]
    pub fn with_researcher(mut self, researcher: Researcher) -> Self {
        self.engine.set_researcher(researcher);
        self
    }

    /// Replaces the script loader.
    #[must_use]
    pub fn with_loader(mut self, loader: impl ScriptLoader + 'static) -> Self {
        self.engine.set_loader(Box::new(loader));
        self
    }

    /// Sets the inbound line limit.
    #[must_use]
    pub fn with_max_envelope_bytes(mut self, max_envelope_bytes: usize) -> Self {
        self.max_envelope_bytes = max_envelope_bytes;
        self
    }

    /// Decodes one inbound line and schedules it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] for malformed lines and unknown types. The
    /// error is already logged; no reply is sent for it.
    pub fn handle_message(&mut self, line: &[u8]) -> Result<(), DispatchError> {
        let envelope = decode_envelope(line, self.max_envelope_bytes).inspect_err(|error| {
            warn!(target: DISPATCH_TARGET, %error, "rejected inbound line");
        })?;
        self.handle_envelope(envelope)
    }

    /// Schedules a decoded envelope.
    ///
    /// The first `initialize` goes to the head of the queue and starts the
    /// execution loop; calling it again never starts a second loop.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownType`] if the type is not a job.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> Result<(), DispatchError> {
        let Some(kind) = JobKind::parse(&envelope.kind) else {
            warn!(
                target: DISPATCH_TARGET,
                kind = envelope.kind.as_str(),
                "ignoring unknown request type"
            );
            return Err(DispatchError::unknown_type(envelope.kind));
        };
        debug!(target: DISPATCH_TARGET, id = %envelope.id, kind = kind.as_str(), "request received");

        let job = Job::new(envelope.id, kind, envelope.payload.unwrap_or(Value::Null));
        if kind == JobKind::Initialize && !self.scheduler.is_polling() {
            self.scheduler.schedule_first(job);
            self.scheduler.start_polling();
        } else {
            self.scheduler.schedule(job);
        }
        Ok(())
    }

    /// Runs one unit of scheduled work.
    ///
    /// Returns `Ok(false)` when nothing was ready.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Io`] if the reply could not be written.
    pub fn step(&mut self) -> Result<bool, DispatchError> {
        let progressed = self.scheduler.step(&mut self.engine);
        match self.engine.take_send_error() {
            Some(error) => Err(error),
            None => Ok(progressed),
        }
    }

    /// Steps until no work is left.
    ///
    /// # Errors
    ///
    /// Stops at the first reply that could not be written.
    pub fn run_until_idle(&mut self) -> Result<usize, DispatchError> {
        let mut steps = 0;
        while self.step()? {
            steps += 1;
        }
        Ok(steps)
    }

    /// Drains every pending job at end of input.
    ///
    /// If no `initialize` ever arrived, polling is started anyway so that
    /// every scheduled request still receives its reply.
    ///
    /// # Errors
    ///
    /// Stops at the first reply that could not be written.
    pub fn finish(&mut self) -> Result<usize, DispatchError> {
        if self.scheduler.pending() > 0 && self.scheduler.start_polling() {
            warn!(
                target: DISPATCH_TARGET,
                pending = self.scheduler.pending(),
                "input closed before initialize; running queued requests with defaults"
            );
        }
        self.run_until_idle()
    }

    /// Registration API for compiled-in plugins.
    pub fn plugin_api(&mut self) -> PluginApi<'_> {
        self.engine.plugin_api()
    }

    /// Whether the execution loop has started.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.scheduler.is_polling()
    }

    /// Jobs and superseded replies still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    /// Current analysis configuration.
    #[must_use]
    pub fn config(&self) -> &Configuration {
        self.engine.config()
    }

    /// Result cache.
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        self.engine.cache()
    }

    /// Pipelines built so far.
    #[must_use]
    pub fn pipelines(&self) -> &Pipelines {
        self.engine.pipelines()
    }

    /// Document of the last analysis, cleared by refreshes and
    /// configuration changes.
    #[must_use]
    pub fn document(&self) -> Option<&Paper> {
        self.engine.document()
    }

    /// Registered plugin assessments and handlers.
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        self.engine.registry()
    }

    /// Last translation catalogue received.
    #[must_use]
    pub fn translations(&self) -> Option<&Value> {
        self.engine.translations()
    }

    /// Query parameters for documentation links.
    #[must_use]
    pub fn query_params(&self) -> &Map<String, Value> {
        self.engine.query_params()
    }

    /// Reply sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        self.engine.sink()
    }

    /// Mutable reply sink.
    pub fn sink_mut(&mut self) -> &mut S {
        self.engine.sink_mut()
    }
}
