//! Pipeline factory that records builds and assessments.

use std::sync::{Arc, Mutex};

use lectern_plugins::{Assessment, AssessmentError, AssessmentResult, Paper};

use crate::pipeline::{Pipeline, PipelineFactory, PipelineKind, PipelineSettings, RulePipeline};

/// One pipeline construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Build {
    pub kind: PipelineKind,
    pub settings: PipelineSettings,
}

#[derive(Debug, Default)]
struct State {
    builds: Vec<Build>,
    assessed: Vec<(PipelineKind, String)>,
}

/// Factory whose pipelines echo the document back as a single result.
///
/// Every `assess` call is recorded with the pipeline kind and the keyword
/// and text it saw, so tests can count pipeline invocations per dimension.
#[derive(Clone, Default)]
pub(crate) struct RecordingFactory {
    state: Arc<Mutex<State>>,
}

impl RecordingFactory {
    pub(crate) fn builds(&self) -> Vec<Build> {
        self.state.lock().expect("factory mutex poisoned").builds.clone()
    }

    pub(crate) fn builds_of(&self, kind: PipelineKind) -> usize {
        self.builds().iter().filter(|build| build.kind == kind).count()
    }

    pub(crate) fn assessed(&self) -> Vec<(PipelineKind, String)> {
        self.state
            .lock()
            .expect("factory mutex poisoned")
            .assessed
            .clone()
    }

    pub(crate) fn invocations(&self) -> usize {
        self.assessed().len()
    }

    pub(crate) fn invocations_of(&self, kind: PipelineKind) -> usize {
        self.assessed()
            .iter()
            .filter(|(assessed, _)| *assessed == kind)
            .count()
    }
}

impl PipelineFactory for RecordingFactory {
    fn build(&self, settings: &PipelineSettings) -> Box<dyn Pipeline> {
        self.state
            .lock()
            .expect("factory mutex poisoned")
            .builds
            .push(Build {
                kind: settings.kind,
                settings: settings.clone(),
            });
        let echo: Arc<dyn Assessment> = Arc::new(|paper: &Paper| {
            Ok::<_, AssessmentError>(AssessmentResult::new(
                9,
                format!("{}|{}", paper.keyword(), paper.text()),
            ))
        });
        Box::new(RecordingPipeline {
            kind: settings.kind,
            inner: RulePipeline::new(vec![("echo".to_owned(), echo)]),
            state: Arc::clone(&self.state),
        })
    }
}

struct RecordingPipeline {
    kind: PipelineKind,
    inner: RulePipeline,
    state: Arc<Mutex<State>>,
}

impl Pipeline for RecordingPipeline {
    fn assess(&mut self, paper: &Paper) -> Result<(), AssessmentError> {
        self.state
            .lock()
            .expect("factory mutex poisoned")
            .assessed
            .push((self.kind, format!("{}|{}", paper.keyword(), paper.synonyms())));
        self.inner.assess(paper)
    }

    fn results(&self) -> &[AssessmentResult] {
        self.inner.results()
    }

    fn calculate_overall_score(&self) -> Option<u32> {
        self.inner.calculate_overall_score()
    }

    fn has_assessment(&self, key: &str) -> bool {
        self.inner.has_assessment(key)
    }

    fn add_assessment(&mut self, key: &str, assessment: Arc<dyn Assessment>) -> bool {
        self.inner.add_assessment(key, assessment)
    }
}
