//! Analysis state and the incremental recomputation policy.
//!
//! [`Analyzer`] owns everything an analysis touches: the configuration, the
//! pipelines, the result cache and the current document. Each dimension is
//! scored only when its fingerprint changed or its pipeline was rebuilt since
//! the cached entry was stored.

use std::collections::{BTreeMap, BTreeSet};

use lectern_config::{Configuration, ConfigurationUpdate, RebuildPlan};
use lectern_plugins::{Paper, PluginRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CACHE_TARGET, Dimension, Fingerprint, ResultCache, ScoredResults};
use crate::codec::encode_payload;
use crate::pipeline::{PipelineFactory, PipelineKind, PipelineSettings, Pipelines};

use super::DISPATCH_TARGET;
use super::errors::JobError;
use super::plugin_api::PluginApi;

/// Payload of `analyze` and `analyzeRelatedKeywords`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeRequest {
    /// Document to score.
    pub paper: Paper,
    /// Related keywords to score, keyed by the caller's identifier.
    pub related_keywords: BTreeMap<String, RelatedKeyword>,
}

/// One related keyword in an analysis request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelatedKeyword {
    /// Keyword to score the document against.
    pub keyword: String,
    /// Comma separated synonyms.
    pub synonyms: String,
}

#[derive(Serialize)]
struct AnalysisReply<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    readability: Option<ScoredResults<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seo: Option<BTreeMap<&'a str, ScoredResults<'a>>>,
}

/// Owner of the scoring state.
pub(crate) struct Analyzer {
    config: Configuration,
    pipelines: Pipelines,
    cache: ResultCache,
    document: Option<Paper>,
    factory: Box<dyn PipelineFactory>,
}

impl Analyzer {
    pub(crate) fn new(factory: Box<dyn PipelineFactory>) -> Self {
        Self {
            config: Configuration::default(),
            pipelines: Pipelines::new(),
            cache: ResultCache::new(),
            document: None,
            factory,
        }
    }

    pub(crate) fn set_factory(&mut self, factory: Box<dyn PipelineFactory>) {
        self.factory = factory;
    }

    pub(crate) fn config(&self) -> &Configuration {
        &self.config
    }

    pub(crate) fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub(crate) fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }

    pub(crate) fn document(&self) -> Option<&Paper> {
        self.document.as_ref()
    }

    pub(crate) fn plugin_api<'a>(&'a mut self, registry: &'a mut PluginRegistry) -> PluginApi<'a> {
        PluginApi::new(
            registry,
            &mut self.pipelines,
            &mut self.cache,
            &mut self.document,
        )
    }

    /// Merges an update, rebuilds the pipelines it affects and clears the
    /// cache. Pipelines never built before are built now.
    pub(crate) fn configure(
        &mut self,
        update: &ConfigurationUpdate,
        registry: &PluginRegistry,
    ) -> RebuildPlan {
        let mut plan = self.config.plan(update);
        self.config.merge(update);

        plan.readability |= !self.pipelines.is_built(PipelineKind::Readability);
        plan.seo |= !self.pipelines.is_built(PipelineKind::Seo)
            || !self.pipelines.is_built(PipelineKind::RelatedKeyword);

        if plan.readability {
            self.rebuild(PipelineKind::Readability, registry);
        }
        if plan.seo {
            self.rebuild(PipelineKind::Seo, registry);
            self.rebuild(PipelineKind::RelatedKeyword, registry);
        }
        self.cache.clear();
        self.document = None;
        plan
    }

    /// Scores the requested dimensions and returns the reply payload.
    pub(crate) fn analyze(
        &mut self,
        request: &AnalyzeRequest,
        registry: &PluginRegistry,
    ) -> Result<Value, JobError> {
        let paper = &request.paper;
        self.follow_locale(paper.locale(), registry);
        // Related results describe the document they were scored on. A new
        // document, or one cleared by a refresh or registration, voids them
        // even when the request names no related keywords.
        if self.document.as_ref() != Some(paper) {
            let dropped = self.cache.drop_related();
            debug!(target: DISPATCH_TARGET, dropped, "document changed");
        }
        self.document = Some(paper.clone());

        if self.config.content_analysis_active {
            self.score(Dimension::Readability, PipelineKind::Readability, paper, registry)?;
        }

        if self.config.keyword_analysis_active {
            self.score(Dimension::primary(), PipelineKind::Seo, paper, registry)?;

            let mut requested = BTreeSet::new();
            for (key, related) in &request.related_keywords {
                if key.is_empty() {
                    warn!(
                        target: DISPATCH_TARGET,
                        keyword = related.keyword.as_str(),
                        "ignoring related keyword with an empty identifier"
                    );
                    continue;
                }
                let variant = paper.for_keyword(&related.keyword, &related.synonyms);
                self.score(
                    Dimension::Seo(key.clone()),
                    PipelineKind::RelatedKeyword,
                    &variant,
                    registry,
                )?;
                requested.insert(key.clone());
            }
            self.cache.prune_related(&requested);
        }

        self.reply()
    }

    fn reply(&self) -> Result<Value, JobError> {
        let readability = self
            .config
            .content_analysis_active
            .then(|| self.cache.entry(&Dimension::Readability))
            .flatten()
            .map(|entry| entry.scored());
        let seo = self.config.keyword_analysis_active.then(|| {
            self.cache
                .seo_entries()
                .map(|(key, entry)| (key, entry.scored()))
                .collect::<BTreeMap<_, _>>()
        });
        encode_payload(&AnalysisReply { readability, seo }).map_err(JobError::Encode)
    }

    fn score(
        &mut self,
        dimension: Dimension,
        kind: PipelineKind,
        paper: &Paper,
        registry: &PluginRegistry,
    ) -> Result<(), JobError> {
        if !self.pipelines.is_built(kind) {
            self.rebuild(kind, registry);
        }
        let fingerprint = match dimension {
            Dimension::Readability => Fingerprint::readability(paper),
            Dimension::Seo(_) => Fingerprint::seo(paper),
        };
        let Some((pipeline, generation)) = self.pipelines.get_mut(kind) else {
            return Ok(());
        };
        if self.cache.fresh(&dimension, fingerprint, generation).is_some() {
            debug!(target: CACHE_TARGET, ?dimension, "cache hit");
            return Ok(());
        }

        pipeline.assess(paper)?;
        let results = pipeline.results().to_vec();
        let score = pipeline.calculate_overall_score();
        self.cache
            .store(&dimension, fingerprint, generation, results, score);
        Ok(())
    }

    /// Adopts the document's locale, rebuilding the pipelines that depend on
    /// it.
    fn follow_locale(&mut self, locale: &str, registry: &PluginRegistry) {
        if locale.is_empty() || locale == self.config.locale {
            return;
        }
        info!(
            target: DISPATCH_TARGET,
            from = self.config.locale.as_str(),
            to = locale,
            "document locale differs from configuration"
        );
        locale.clone_into(&mut self.config.locale);
        self.rebuild(PipelineKind::Readability, registry);
    }

    fn rebuild(&mut self, kind: PipelineKind, registry: &PluginRegistry) {
        let settings = PipelineSettings::from_config(kind, &self.config);
        self.pipelines
            .rebuild(self.factory.as_ref(), &settings, registry);
    }
}
