//! Built-in rule catalogue.
//!
//! The rules here are deliberately simple structural checks; language-aware
//! rules arrive as plugin assessments. Each rule is a closure implementing
//! [`Assessment`], keyed by its identifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use lectern_plugins::{Assessment, AssessmentError, AssessmentResult, Paper};

use super::{Pipeline, PipelineFactory, PipelineKind, PipelineSettings, PipelineVariant, RulePipeline};

/// Identifier of the rule added by `useKeywordDistribution`.
pub const KEYPHRASE_DISTRIBUTION: &str = "keyphraseDistribution";

type Rule = (String, Arc<dyn Assessment>);

/// Rules per pipeline kind and variant.
///
/// A variant with no rules of its own falls back to the standard rules of the
/// same kind.
#[derive(Clone, Default)]
pub struct RuleCatalog {
    rules: BTreeMap<(PipelineKind, PipelineVariant), Vec<Rule>>,
    distribution: Option<Arc<dyn Assessment>>,
}

impl RuleCatalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to one kind and variant.
    #[must_use]
    pub fn with_rule(
        mut self,
        kind: PipelineKind,
        variant: PipelineVariant,
        key: &str,
        rule: Arc<dyn Assessment>,
    ) -> Self {
        self.rules
            .entry((kind, variant))
            .or_default()
            .push((key.to_owned(), rule));
        self
    }

    /// Sets the rule added to the primary SEO pipeline on request.
    #[must_use]
    pub fn with_distribution_rule(mut self, rule: Arc<dyn Assessment>) -> Self {
        self.distribution = Some(rule);
        self
    }

    /// The built-in catalogue.
    #[must_use]
    pub fn standard() -> Self {
        use PipelineKind::{Readability, RelatedKeyword, Seo};
        use PipelineVariant::{Cornerstone, Standard, Taxonomy};

        let mut catalog = Self::new()
            .with_rule(Readability, Standard, "textPresence", Arc::new(text_presence))
            .with_rule(Readability, Standard, "sentenceLength", sentence_length(20))
            .with_rule(Readability, Cornerstone, "textPresence", Arc::new(text_presence))
            .with_rule(Readability, Cornerstone, "sentenceLength", sentence_length(15))
            .with_distribution_rule(keyphrase_distribution());

        for variant in [Standard, Cornerstone] {
            let minimum_words = if variant == Cornerstone { 900 } else { 300 };
            catalog = catalog
                .with_rule(Seo, variant, "keyphraseLength", keyphrase_length())
                .with_rule(Seo, variant, "titleKeyword", title_keyword())
                .with_rule(Seo, variant, "textLength", text_length(minimum_words))
                .with_rule(Seo, variant, "metaDescriptionLength", Arc::new(description_length))
                .with_rule(Seo, variant, "urlLength", url_length())
                .with_rule(RelatedKeyword, variant, "keyphraseLength", keyphrase_length())
                .with_rule(RelatedKeyword, variant, "textKeyword", text_keyword());
        }
        catalog
            .with_rule(Seo, Taxonomy, "keyphraseLength", keyphrase_length())
            .with_rule(Seo, Taxonomy, "titleKeyword", title_keyword())
            .with_rule(Seo, Taxonomy, "textLength", text_length(150))
            .with_rule(RelatedKeyword, Taxonomy, "textKeyword", text_keyword())
    }

    fn rules_for(&self, kind: PipelineKind, variant: PipelineVariant) -> Vec<Rule> {
        self.rules
            .get(&(kind, variant))
            .or_else(|| self.rules.get(&(kind, PipelineVariant::Standard)))
            .cloned()
            .unwrap_or_default()
    }
}

impl PipelineFactory for RuleCatalog {
    fn build(&self, settings: &PipelineSettings) -> Box<dyn Pipeline> {
        let mut pipeline = RulePipeline::new(self.rules_for(settings.kind, settings.variant));
        if settings.keyword_distribution
            && let Some(rule) = &self.distribution
        {
            pipeline.add_assessment(KEYPHRASE_DISTRIBUTION, Arc::clone(rule));
        }
        Box::new(pipeline)
    }
}

type RuleResult = Result<AssessmentResult, AssessmentError>;

/// A rule that only applies to documents passing a predicate.
struct Guarded<F> {
    applies: fn(&Paper) -> bool,
    rule: F,
}

impl<F> Assessment for Guarded<F>
where
    F: Fn(&Paper) -> RuleResult + Send + Sync,
{
    fn is_applicable(&self, paper: &Paper) -> bool {
        (self.applies)(paper)
    }

    fn assess(&self, paper: &Paper) -> RuleResult {
        (self.rule)(paper)
    }
}

fn guarded<F>(applies: fn(&Paper) -> bool, rule: F) -> Arc<dyn Assessment>
where
    F: Fn(&Paper) -> RuleResult + Send + Sync + 'static,
{
    Arc::new(Guarded { applies, rule })
}

fn has_keyword(paper: &Paper) -> bool {
    !paper.keyword().trim().is_empty()
}

fn has_url(paper: &Paper) -> bool {
    !paper.url().is_empty()
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    let keyword = keyword.trim();
    !keyword.is_empty() && haystack.to_lowercase().contains(&keyword.to_lowercase())
}

fn text_presence(paper: &Paper) -> RuleResult {
    Ok(if paper.has_text() {
        AssessmentResult::new(9, "The document has text.")
    } else {
        AssessmentResult::new(3, "Add some text to the document.")
    })
}

fn sentence_length(max_average: usize) -> Arc<dyn Assessment> {
    Arc::new(move |paper: &Paper| -> RuleResult {
        let sentences: Vec<&str> = paper
            .text()
            .split(['.', '!', '?'])
            .filter(|sentence| !sentence.trim().is_empty())
            .collect();
        let words: usize = sentences.iter().map(|sentence| word_count(sentence)).sum();
        let limit = max_average.saturating_mul(sentences.len());
        Ok(if words <= limit {
            AssessmentResult::new(9, "Sentences are a comfortable length.")
        } else if words * 4 <= limit * 5 {
            AssessmentResult::new(6, "Some sentences are on the long side.")
        } else {
            AssessmentResult::new(3, "Sentences are too long on average.")
        })
    })
}

fn text_length(minimum_words: usize) -> Arc<dyn Assessment> {
    Arc::new(move |paper: &Paper| -> RuleResult {
        let words = word_count(paper.text());
        Ok(if words >= minimum_words {
            AssessmentResult::new(9, format!("The text contains {words} words."))
        } else if words * 3 >= minimum_words {
            AssessmentResult::new(6, format!("The text contains {words} words; add more."))
        } else {
            AssessmentResult::new(3, format!("The text contains only {words} words."))
        })
    })
}

fn keyphrase_length() -> Arc<dyn Assessment> {
    guarded(has_keyword, |paper: &Paper| -> RuleResult {
        Ok(if word_count(paper.keyword()) <= 4 {
            AssessmentResult::new(9, "The keyphrase has a good length.")
        } else {
            AssessmentResult::new(3, "The keyphrase is too long.")
        })
    })
}

fn title_keyword() -> Arc<dyn Assessment> {
    guarded(has_keyword, |paper: &Paper| -> RuleResult {
        Ok(if contains_keyword(paper.title(), paper.keyword()) {
            AssessmentResult::new(9, "The title contains the keyphrase.")
        } else {
            AssessmentResult::new(2, "Use the keyphrase in the title.")
        })
    })
}

fn text_keyword() -> Arc<dyn Assessment> {
    guarded(has_keyword, |paper: &Paper| -> RuleResult {
        Ok(if contains_keyword(paper.text(), paper.keyword()) {
            AssessmentResult::new(9, "The text uses the keyphrase.").with_marks()
        } else {
            AssessmentResult::new(3, "The text does not use the keyphrase.")
        })
    })
}

fn description_length(paper: &Paper) -> RuleResult {
    Ok(match paper.description().chars().count() {
        0 => AssessmentResult::new(1, "No meta description has been specified."),
        120..=156 => AssessmentResult::new(9, "The meta description has a good length."),
        _ => AssessmentResult::new(6, "Adjust the meta description length."),
    })
}

fn url_length() -> Arc<dyn Assessment> {
    guarded(has_url, |paper: &Paper| -> RuleResult {
        Ok(if paper.url().chars().count() > 75 {
            AssessmentResult::new(6, "The URL is too long.")
        } else {
            AssessmentResult::new(9, "The URL has a good length.")
        })
    })
}

fn keyphrase_distribution() -> Arc<dyn Assessment> {
    guarded(has_keyword, |paper: &Paper| -> RuleResult {
        let paragraphs: Vec<&str> = paper
            .text()
            .split("\n\n")
            .filter(|paragraph| !paragraph.trim().is_empty())
            .collect();
        let hits = paragraphs
            .iter()
            .filter(|paragraph| contains_keyword(paragraph, paper.keyword()))
            .count();
        Ok(if hits == 0 {
            AssessmentResult::new(1, "The keyphrase does not appear in the text.")
        } else if hits * 2 >= paragraphs.len() {
            AssessmentResult::new(9, "The keyphrase is spread across the text.").with_marks()
        } else {
            AssessmentResult::new(6, "The keyphrase is concentrated in a few paragraphs.")
                .with_marks()
        })
    })
}
