//! Scoring pipelines and the slots that hold them.
//!
//! A [`Pipeline`] is an ordered set of rules producing per-rule results and an
//! overall score. Pipelines are created by a [`PipelineFactory`] and kept in
//! [`Pipelines`], which stamps every build or modification with a fresh
//! generation so the result cache can tell when an entry was produced by a
//! pipeline that no longer exists.

mod rules;

use std::collections::BTreeMap;
use std::sync::Arc;

use lectern_config::Configuration;
use lectern_plugins::{Assessment, AssessmentError, AssessmentResult, MAX_RATING, Paper, PluginRegistry};
use tracing::debug;

pub use self::rules::{KEYPHRASE_DISTRIBUTION, RuleCatalog};

/// Tracing target for pipeline construction.
const PIPELINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pipeline");

/// Behaviour the host needs from a scoring pipeline.
pub trait Pipeline: Send {
    /// Scores the document, replacing any previous results.
    ///
    /// # Errors
    ///
    /// Returns the first [`AssessmentError`] raised by a rule.
    fn assess(&mut self, paper: &Paper) -> Result<(), AssessmentError>;

    /// Results of the last [`Pipeline::assess`] call.
    fn results(&self) -> &[AssessmentResult];

    /// Overall score of the last run, `None` when no rule applied.
    fn calculate_overall_score(&self) -> Option<u32>;

    /// Whether a rule is registered under `key`.
    fn has_assessment(&self, key: &str) -> bool;

    /// Appends a rule. Returns `false` if `key` is already present.
    fn add_assessment(&mut self, key: &str, assessment: Arc<dyn Assessment>) -> bool;
}

/// Pipeline built from an ordered list of keyed rules.
#[derive(Default)]
pub struct RulePipeline {
    rules: Vec<(String, Arc<dyn Assessment>)>,
    results: Vec<AssessmentResult>,
}

impl RulePipeline {
    /// Creates a pipeline from keyed rules.
    #[must_use]
    pub fn new(rules: Vec<(String, Arc<dyn Assessment>)>) -> Self {
        Self {
            rules,
            results: Vec::new(),
        }
    }

    /// Rule keys in evaluation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(key, _)| key.as_str())
    }
}

impl Pipeline for RulePipeline {
    fn assess(&mut self, paper: &Paper) -> Result<(), AssessmentError> {
        self.results.clear();
        for (key, rule) in &self.rules {
            if !rule.is_applicable(paper) {
                continue;
            }
            let mut result = rule.assess(paper)?;
            if result.identifier().is_empty() {
                result = result.with_identifier(key.as_str());
            }
            self.results.push(result);
        }
        Ok(())
    }

    fn results(&self) -> &[AssessmentResult] {
        &self.results
    }

    fn calculate_overall_score(&self) -> Option<u32> {
        let count = u32::try_from(self.results.len()).ok()?;
        let total: u32 = self.results.iter().map(|r| u32::from(r.score())).sum();
        let maximum = count.checked_mul(u32::from(MAX_RATING))?;
        // Rounded percentage of the maximum attainable rating.
        (total * 200 + maximum).checked_div(maximum * 2)
    }

    fn has_assessment(&self, key: &str) -> bool {
        self.rules.iter().any(|(existing, _)| existing == key)
    }

    fn add_assessment(&mut self, key: &str, assessment: Arc<dyn Assessment>) -> bool {
        if self.has_assessment(key) {
            return false;
        }
        self.rules.push((key.to_owned(), assessment));
        true
    }
}

/// The three pipelines the host maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineKind {
    /// Readability of the text.
    Readability,
    /// SEO for the primary keyword.
    Seo,
    /// SEO for related keywords.
    RelatedKeyword,
}

/// Rule-set variant selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineVariant {
    /// Default thresholds.
    Standard,
    /// Stricter thresholds for cornerstone content.
    Cornerstone,
    /// Taxonomy pages; SEO kinds only.
    Taxonomy,
}

impl PipelineVariant {
    /// Picks the variant for `kind` under `config`.
    ///
    /// Taxonomy wins over cornerstone for the SEO kinds; readability has no
    /// taxonomy variant.
    #[must_use]
    pub fn select(kind: PipelineKind, config: &Configuration) -> Self {
        if kind != PipelineKind::Readability && config.use_taxonomy {
            Self::Taxonomy
        } else if config.use_cornerstone {
            Self::Cornerstone
        } else {
            Self::Standard
        }
    }
}

/// Everything a factory needs to build one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Pipeline to build.
    pub kind: PipelineKind,
    /// Rule-set variant.
    pub variant: PipelineVariant,
    /// Active locale.
    pub locale: String,
    /// Whether to add the keyphrase distribution rule.
    pub keyword_distribution: bool,
}

impl PipelineSettings {
    /// Derives settings for `kind` from the analysis configuration.
    #[must_use]
    pub fn from_config(kind: PipelineKind, config: &Configuration) -> Self {
        Self {
            kind,
            variant: PipelineVariant::select(kind, config),
            locale: config.locale.clone(),
            keyword_distribution: kind == PipelineKind::Seo && config.use_keyword_distribution,
        }
    }
}

/// Builds pipelines for the host.
pub trait PipelineFactory: Send {
    /// Builds a pipeline without plugin rules; the host adds those itself.
    fn build(&self, settings: &PipelineSettings) -> Box<dyn Pipeline>;
}

struct Slot {
    pipeline: Box<dyn Pipeline>,
    generation: u64,
}

/// The host's pipelines, each stamped with a generation.
#[derive(Default)]
pub struct Pipelines {
    slots: BTreeMap<PipelineKind, Slot>,
    last_generation: u64,
}

impl std::fmt::Debug for Pipelines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(kind, slot)| (kind, slot.generation)))
            .finish()
    }
}

impl Pipelines {
    /// Creates an empty set; nothing is built yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `kind` has been built.
    #[must_use]
    pub fn is_built(&self, kind: PipelineKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Generation of the pipeline for `kind`, if built.
    #[must_use]
    pub fn generation(&self, kind: PipelineKind) -> Option<u64> {
        self.slots.get(&kind).map(|slot| slot.generation)
    }

    /// Builds (or rebuilds) `kind`, adding registered plugin rules to the SEO
    /// kinds. Returns the new generation.
    pub fn rebuild(
        &mut self,
        factory: &dyn PipelineFactory,
        settings: &PipelineSettings,
        registry: &PluginRegistry,
    ) -> u64 {
        let mut pipeline = factory.build(settings);
        if settings.kind != PipelineKind::Readability {
            for (key, assessment) in registry.assessments() {
                pipeline.add_assessment(key, Arc::clone(assessment));
            }
        }
        let generation = self.next_generation();
        debug!(
            target: PIPELINE_TARGET,
            kind = ?settings.kind,
            variant = ?settings.variant,
            locale = settings.locale.as_str(),
            generation,
            "pipeline built"
        );
        self.slots.insert(settings.kind, Slot {
            pipeline,
            generation,
        });
        generation
    }

    /// Adds a newly registered plugin rule to every built SEO pipeline that
    /// lacks it. Returns the number of pipelines changed.
    pub fn add_registered(&mut self, key: &str, assessment: &Arc<dyn Assessment>) -> usize {
        let mut changed = 0;
        for kind in [PipelineKind::Seo, PipelineKind::RelatedKeyword] {
            let Some(slot) = self.slots.get_mut(&kind) else {
                continue;
            };
            if slot.pipeline.add_assessment(key, Arc::clone(assessment)) {
                self.last_generation += 1;
                slot.generation = self.last_generation;
                changed += 1;
            }
        }
        changed
    }

    /// Mutable access to a built pipeline and its generation.
    pub fn get_mut(&mut self, kind: PipelineKind) -> Option<(&mut (dyn Pipeline + '_), u64)> {
        let slot = self.slots.get_mut(&kind)?;
        Some((slot.pipeline.as_mut() as &mut dyn Pipeline, slot.generation))
    }

    fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }
}
