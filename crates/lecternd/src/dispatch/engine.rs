//! Job bodies and reply composition.
//!
//! [`Engine`] is the [`JobRunner`] the scheduler drives. `execute` runs one
//! request against the host state; `done` turns the outcome into exactly one
//! reply envelope.

use lectern_config::{Configuration, ConfigurationUpdate};
use lectern_plugins::{Paper, PluginRegistry};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

use crate::cache::ResultCache;
use crate::codec::{Envelope, decode_payload};
use crate::pipeline::{PipelineFactory, Pipelines};
use crate::research::Researcher;
use crate::scheduler::{Completion, Job, JobKind, JobRunner, Outcome};
use crate::scripts::ScriptLoader;

use super::DISPATCH_TARGET;
use super::analyze::{AnalyzeRequest, Analyzer};
use super::errors::{DispatchError, JobError};
use super::plugin_api::PluginApi;
use super::response::ReplySink;

const MISSING_URL: &str = "Load Script was called without an URL.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoadScriptRequest {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResearchRequest {
    name: String,
    paper: Option<Paper>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CustomMessageRequest {
    name: String,
    data: Value,
}

/// Host state shared by every job.
pub(crate) struct Engine<S> {
    analyzer: Analyzer,
    registry: PluginRegistry,
    researcher: Researcher,
    loader: Box<dyn ScriptLoader>,
    translations: Option<Value>,
    query_params: Map<String, Value>,
    sink: S,
    send_error: Option<DispatchError>,
}

impl<S: ReplySink> Engine<S> {
    pub(crate) fn new(
        sink: S,
        factory: Box<dyn PipelineFactory>,
        researcher: Researcher,
        loader: Box<dyn ScriptLoader>,
    ) -> Self {
        Self {
            analyzer: Analyzer::new(factory),
            registry: PluginRegistry::new(),
            researcher,
            loader,
            translations: None,
            query_params: Map::new(),
            sink,
            send_error: None,
        }
    }

    pub(crate) fn set_factory(&mut self, factory: Box<dyn PipelineFactory>) {
        self.analyzer.set_factory(factory);
    }

    pub(crate) fn set_researcher(&mut self, researcher: Researcher) {
        self.researcher = researcher;
    }

    pub(crate) fn set_loader(&mut self, loader: Box<dyn ScriptLoader>) {
        self.loader = loader;
    }

    pub(crate) fn plugin_api(&mut self) -> PluginApi<'_> {
        self.analyzer.plugin_api(&mut self.registry)
    }

    pub(crate) fn config(&self) -> &Configuration {
        self.analyzer.config()
    }

    pub(crate) fn cache(&self) -> &ResultCache {
        self.analyzer.cache()
    }

    pub(crate) fn pipelines(&self) -> &Pipelines {
        self.analyzer.pipelines()
    }

    pub(crate) fn document(&self) -> Option<&Paper> {
        self.analyzer.document()
    }

    pub(crate) fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub(crate) fn translations(&self) -> Option<&Value> {
        self.translations.as_ref()
    }

    pub(crate) fn query_params(&self) -> &Map<String, Value> {
        &self.query_params
    }

    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Takes the first reply write failure since the last call.
    pub(crate) fn take_send_error(&mut self) -> Option<DispatchError> {
        self.send_error.take()
    }

    fn initialize(&mut self, data: &Value) -> Completion {
        let update = ConfigurationUpdate::from_value(data);
        if let Some(research_data) = &update.research_data {
            for (name, value) in research_data {
                self.researcher.add_research_data(name, value.clone());
            }
        }
        if let Some(translations) = &update.translations {
            self.translations = Some(translations.clone());
        }
        if let Some(params) = &update.default_query_params {
            self.query_params.clone_from(params);
        }

        let plan = self.analyzer.configure(&update, &self.registry);
        info!(
            target: DISPATCH_TARGET,
            rebuilt_readability = plan.readability,
            rebuilt_seo = plan.seo,
            locale = self.analyzer.config().locale.as_str(),
            "configuration applied"
        );
        Completion::Done(Value::Null)
    }

    fn analyze(&mut self, kind: JobKind, data: &Value) -> Result<Completion, JobError> {
        let request: AnalyzeRequest =
            decode_payload(data).map_err(|source| JobError::payload(kind, source))?;
        let reply = self.analyzer.analyze(&request, &self.registry)?;
        Ok(Completion::Done(reply))
    }

    fn load_script(&mut self, data: &Value) -> Result<Completion, JobError> {
        let request: LoadScriptRequest = decode_payload(data)
            .map_err(|source| JobError::payload(JobKind::LoadScript, source))?;
        let Some(url) = request.url.filter(|url| !url.trim().is_empty()) else {
            return Ok(Completion::Failed(
                json!({"loaded": false, "url": Value::Null, "message": MISSING_URL}),
            ));
        };

        let mut api = self.analyzer.plugin_api(&mut self.registry);
        match self.loader.load(&url, &mut api) {
            Ok(()) => {
                info!(target: DISPATCH_TARGET, url = url.as_str(), "script loaded");
                Ok(Completion::Done(json!({"loaded": true, "url": url})))
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, url = url.as_str(), %error, "script failed to load");
                Ok(Completion::Failed(
                    json!({"loaded": false, "url": url, "message": error.to_string()}),
                ))
            }
        }
    }

    fn run_research(&self, data: &Value) -> Result<Completion, JobError> {
        let request: ResearchRequest = decode_payload(data)
            .map_err(|source| JobError::payload(JobKind::RunResearch, source))?;
        // A one-off paper is scored in isolation and never becomes the
        // current document.
        let paper = match &request.paper {
            Some(paper) => paper,
            None => self.analyzer.document().ok_or(JobError::NoDocument)?,
        };
        let result = self.researcher.run(&request.name, paper)?;
        Ok(Completion::Done(result))
    }

    fn custom_message(&self, data: &Value) -> Result<Completion, JobError> {
        let request: CustomMessageRequest = decode_payload(data)
            .map_err(|source| JobError::payload(JobKind::CustomMessage, source))?;
        let handler = self
            .registry
            .message_handler(&request.name)
            .ok_or_else(|| JobError::no_handler(request.name.as_str()))?;
        let reply = handler
            .handle(request.data)
            .map_err(|source| JobError::Handler {
                name: request.name.clone(),
                source,
            })?;
        Ok(Completion::Done(reply))
    }

    fn reply_for(job: &Job, outcome: Outcome) -> Envelope {
        let kind = job.kind.as_str();
        let id = job.id.clone();
        match outcome {
            Outcome::Completed(Completion::Done(payload)) => Envelope::done(kind, id, payload),
            Outcome::Completed(Completion::Failed(payload)) => {
                Envelope::failed(kind, id, payload)
            }
            // Configuration is corrected by merging, so initialize always
            // acknowledges.
            Outcome::Failed(failure) if job.kind == JobKind::Initialize => {
                error!(target: DISPATCH_TARGET, id = %failure.id, error = %failure, "initialize failed");
                Envelope::done(kind, id, Value::Null)
            }
            Outcome::Failed(failure) => {
                error!(
                    target: DISPATCH_TARGET,
                    id = %failure.id,
                    kind,
                    error = failure.error.as_str(),
                    "job failed"
                );
                Envelope::failed(kind, id, failure.to_payload())
            }
            Outcome::Superseded { by } => Envelope::failed(
                kind,
                id,
                json!({
                    "error": format!("Superseded by request {by}."),
                    "supersededBy": by,
                }),
            ),
        }
    }
}

impl<S: ReplySink> JobRunner for Engine<S> {
    type Error = JobError;

    fn execute(&mut self, job: &Job) -> Result<Completion, JobError> {
        debug!(target: DISPATCH_TARGET, id = %job.id, kind = job.kind.as_str(), "executing job");
        match job.kind {
            JobKind::Initialize => Ok(self.initialize(&job.data)),
            JobKind::Analyze | JobKind::AnalyzeRelatedKeywords => self.analyze(job.kind, &job.data),
            JobKind::LoadScript => self.load_script(&job.data),
            JobKind::RunResearch => self.run_research(&job.data),
            JobKind::CustomMessage => self.custom_message(&job.data),
        }
    }

    fn done(&mut self, job: &Job, outcome: Outcome) {
        let reply = Self::reply_for(job, outcome);
        debug!(target: DISPATCH_TARGET, id = %reply.id, kind = reply.kind.as_str(), "sending reply");
        if let Err(error) = self.sink.send(&reply) {
            error!(target: DISPATCH_TARGET, id = %reply.id, %error, "failed to send reply");
            if self.send_error.is_none() {
                self.send_error = Some(error);
            }
        }
    }
}
