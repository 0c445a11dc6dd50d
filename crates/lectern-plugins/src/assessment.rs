//! Interfaces implemented by scoring rules, research units, and message
//! handlers.
//!
//! The host treats all three as opaque collaborators. Closures with the
//! matching signature implement the traits directly, so simple plugins do not
//! need a named type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Paper;
use crate::error::{AssessmentError, HandlerError, ResearchError};

/// Highest rating a single assessment can award.
pub const MAX_RATING: u8 = 9;

/// Outcome of one scoring rule applied to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    #[serde(default)]
    identifier: String,
    score: u8,
    #[serde(default)]
    text: String,
    #[serde(default)]
    has_marks: bool,
}

impl AssessmentResult {
    /// Creates a result with the given rating and feedback text.
    ///
    /// Ratings above [`MAX_RATING`] are clamped.
    #[must_use]
    pub fn new(score: u8, text: impl Into<String>) -> Self {
        Self {
            identifier: String::new(),
            score: score.min(MAX_RATING),
            text: text.into(),
            has_marks: false,
        }
    }

    /// Sets the identifier of the rule that produced this result.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Flags that the rule can highlight the passages it refers to.
    #[must_use]
    pub fn with_marks(mut self) -> Self {
        self.has_marks = true;
        self
    }

    /// Identifier of the producing rule.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Rating between 0 and [`MAX_RATING`].
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    /// Feedback text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the result carries highlight marks.
    #[must_use]
    pub fn has_marks(&self) -> bool {
        self.has_marks
    }
}

/// A single scoring rule.
pub trait Assessment: Send + Sync {
    /// Returns `false` when the rule has nothing to say about the document.
    ///
    /// Inapplicable rules are skipped and contribute no result.
    fn is_applicable(&self, _paper: &Paper) -> bool {
        true
    }

    /// Scores the document.
    ///
    /// # Errors
    ///
    /// Returns [`AssessmentError`] when the rule cannot produce a rating.
    fn assess(&self, paper: &Paper) -> Result<AssessmentResult, AssessmentError>;
}

impl<F> Assessment for F
where
    F: Fn(&Paper) -> Result<AssessmentResult, AssessmentError> + Send + Sync,
{
    fn assess(&self, paper: &Paper) -> Result<AssessmentResult, AssessmentError> {
        self(paper)
    }
}

/// Handler for plugin-defined custom messages.
pub trait MessageHandler: Send + Sync {
    /// Handles the caller-supplied data and returns the reply payload.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the handler rejects the data.
    fn handle(&self, data: Value) -> Result<Value, HandlerError>;
}

impl<F> MessageHandler for F
where
    F: Fn(Value) -> Result<Value, HandlerError> + Send + Sync,
{
    fn handle(&self, data: Value) -> Result<Value, HandlerError> {
        self(data)
    }
}

/// A named research unit that extracts data from a document.
pub trait Research: Send + Sync {
    /// Runs the research, optionally seeded with precomputed data.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError`] when the research fails.
    fn run(&self, paper: &Paper, data: Option<&Value>) -> Result<Value, ResearchError>;
}

impl<F> Research for F
where
    F: Fn(&Paper, Option<&Value>) -> Result<Value, ResearchError> + Send + Sync,
{
    fn run(&self, paper: &Paper, data: Option<&Value>) -> Result<Value, ResearchError> {
        self(paper, data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ratings_are_clamped() {
        assert_eq!(AssessmentResult::new(42, "").score(), MAX_RATING);
    }

    #[test]
    fn closures_act_as_assessments() {
        let rule = |paper: &Paper| {
            Ok::<_, AssessmentError>(AssessmentResult::new(u8::from(paper.has_text()) * 9, "ok"))
        };
        let result = rule.assess(&Paper::new("text")).expect("assess");
        assert_eq!(result.score(), 9);
        assert!(rule.is_applicable(&Paper::default()));
    }

    #[test]
    fn result_serialises_in_camel_case() {
        let result = AssessmentResult::new(6, "fine")
            .with_identifier("textLength")
            .with_marks();
        let value = serde_json::to_value(&result).expect("serialise");
        assert_eq!(
            value,
            json!({"identifier": "textLength", "score": 6, "text": "fine", "hasMarks": true})
        );
    }
}
