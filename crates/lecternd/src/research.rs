//! Named research units run on demand through `runResearch`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lectern_plugins::{Paper, Research, ResearchError};
use serde_json::{Value, json};

/// Registry of research units plus precomputed research data.
#[derive(Clone, Default)]
pub struct Researcher {
    researches: HashMap<String, Arc<dyn Research>>,
    data: HashMap<String, Value>,
}

impl fmt::Debug for Researcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.researches.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Researcher")
            .field("researches", &names)
            .field("data", &self.data.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Researcher {
    /// Creates a researcher with no researches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in researches.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_research("wordCountInText", Arc::new(word_count_in_text))
            .with_research("keywordCountInUrl", Arc::new(keyword_count_in_url))
            .with_research("morphology", Arc::new(morphology))
    }

    /// Adds or replaces a research.
    #[must_use]
    pub fn with_research(mut self, name: &str, research: Arc<dyn Research>) -> Self {
        self.researches.insert(name.to_owned(), research);
        self
    }

    /// Stores precomputed data handed to the research of the same name.
    pub fn add_research_data(&mut self, name: &str, data: Value) {
        self.data.insert(name.to_owned(), data);
    }

    /// Precomputed data for `name`, if any.
    #[must_use]
    pub fn research_data(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Whether a research named `name` exists.
    #[must_use]
    pub fn has_research(&self, name: &str) -> bool {
        self.researches.contains_key(name)
    }

    /// Runs the named research against `paper`.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::MissingName`] for a blank name,
    /// [`ResearchError::Unknown`] for an unregistered one, or whatever the
    /// research itself reports.
    pub fn run(&self, name: &str, paper: &Paper) -> Result<Value, ResearchError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ResearchError::MissingName);
        }
        let research = self
            .researches
            .get(name)
            .ok_or_else(|| ResearchError::Unknown {
                name: name.to_owned(),
            })?;
        research.run(paper, self.data.get(name))
    }
}

fn word_count_in_text(paper: &Paper, _: Option<&Value>) -> Result<Value, ResearchError> {
    Ok(json!(paper.text().split_whitespace().count()))
}

fn keyword_count_in_url(paper: &Paper, _: Option<&Value>) -> Result<Value, ResearchError> {
    let url = paper.url().to_lowercase();
    let count = paper
        .keyword()
        .split_whitespace()
        .filter(|word| url.contains(&word.to_lowercase()))
        .count();
    Ok(json!(count))
}

fn morphology(_: &Paper, data: Option<&Value>) -> Result<Value, ResearchError> {
    data.cloned()
        .ok_or_else(|| ResearchError::failed("morphology", "no morphology data has been loaded"))
}
