//! BDD test world: a dispatcher wired to a recording factory, plus the
//! bootstrap collaborators.

use std::cell::RefCell;
use std::sync::Arc;

use serde_json::Value;

use crate::bootstrap::{BootstrapError, ConfigLoader, Host, bootstrap_with};
use crate::codec::{Envelope, RequestId};
use crate::dispatch::Dispatcher;

use super::factory::RecordingFactory;
use super::reporter::RecordingHealthReporter;
use super::request;

/// Scenario world shared across BDD steps.
pub(crate) struct HostWorld {
    pub factory: RecordingFactory,
    pub dispatcher: Dispatcher<Vec<Envelope>>,
    pub analysis_ids: Vec<u64>,
    pub reporter: Arc<RecordingHealthReporter>,
    host: Option<Host>,
    bootstrap_error: Option<BootstrapError>,
    sent: Vec<u64>,
}

impl HostWorld {
    fn new() -> Self {
        let factory = RecordingFactory::default();
        Self {
            dispatcher: Dispatcher::new(Vec::new()).with_factory(factory.clone()),
            factory,
            analysis_ids: Vec::new(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            host: None,
            bootstrap_error: None,
            sent: Vec::new(),
        }
    }

    /// Sends a request without running the loop.
    pub(crate) fn send(&mut self, kind: &str, payload: Value) -> u64 {
        let id = u64::try_from(self.sent.len()).expect("request count fits u64") + 1;
        self.dispatcher
            .handle_message(&request(kind, id, payload))
            .expect("request accepted");
        self.sent.push(id);
        if kind.starts_with("analyze") {
            self.analysis_ids.push(id);
        }
        id
    }

    /// Runs the loop until nothing is left.
    pub(crate) fn run(&mut self) {
        self.dispatcher.run_until_idle().expect("replies written");
    }

    /// Ids of every request sent so far.
    pub(crate) fn sent(&self) -> &[u64] {
        &self.sent
    }

    pub(crate) fn replies(&self) -> &[Envelope] {
        self.dispatcher.sink()
    }

    /// The single reply for `id`.
    pub(crate) fn reply(&self, id: u64) -> &Envelope {
        let id = RequestId::from(id);
        self.replies()
            .iter()
            .find(|reply| reply.id == id)
            .unwrap_or_else(|| panic!("no reply for request {id}"))
    }

    /// Payload of the reply to the `nth_last` analysis (0 is the latest).
    pub(crate) fn analysis_payload(&self, nth_last: usize) -> Value {
        let id = self
            .analysis_ids
            .iter()
            .rev()
            .nth(nth_last)
            .copied()
            .expect("analysis was sent");
        self.reply(id).payload.clone().unwrap_or(Value::Null)
    }

    pub(crate) fn bootstrap(&mut self, loader: &dyn ConfigLoader) {
        match bootstrap_with(loader, self.reporter.clone()) {
            Ok(host) => self.host = Some(host),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    pub(crate) fn host(&self) -> Option<&Host> {
        self.host.as_ref()
    }

    pub(crate) fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }
}

/// Fresh world for each scenario.
pub(crate) fn world() -> RefCell<HostWorld> {
    RefCell::new(HostWorld::new())
}
