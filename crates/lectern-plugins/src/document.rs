//! Document model handed to scoring pipelines.
//!
//! A [`Paper`] is the unit of text being scored together with the metadata
//! the scoring rules read. The host never interprets the text itself; it only
//! compares documents to decide whether cached results are still valid.

use serde::{Deserialize, Serialize};

/// Locale assumed when a document does not declare one.
pub const DEFAULT_LOCALE: &str = "en_US";

/// A document submitted for analysis.
///
/// Every field is optional on the wire; missing fields decode to empty
/// strings, except `locale`, which falls back to [`DEFAULT_LOCALE`].
///
/// # Example
///
/// ```
/// use lectern_plugins::Paper;
///
/// let paper = Paper::new("Some text.")
///     .with_locale("nl_NL")
///     .with_keyword("text", "words");
/// assert_eq!(paper.locale(), "nl_NL");
/// assert_eq!(paper.keyword(), "text");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paper {
    text: String,
    locale: String,
    keyword: String,
    synonyms: String,
    title: String,
    url: String,
    description: String,
}

impl Default for Paper {
    fn default() -> Self {
        Self {
            text: String::new(),
            locale: DEFAULT_LOCALE.to_owned(),
            keyword: String::new(),
            synonyms: String::new(),
            title: String::new(),
            url: String::new(),
            description: String::new(),
        }
    }
}

impl Paper {
    /// Creates a document with the given text and default metadata.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the document locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets the focus keyword and its synonyms.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>, synonyms: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self.synonyms = synonyms.into();
        self
    }

    /// Sets the document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the document URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the meta description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns a copy of this document targeting a different keyword.
    ///
    /// Related-keyword analysis scores the same text against each related
    /// keyword in turn.
    #[must_use]
    pub fn for_keyword(&self, keyword: &str, synonyms: &str) -> Self {
        Self {
            keyword: keyword.to_owned(),
            synonyms: synonyms.to_owned(),
            ..self.clone()
        }
    }

    /// Document body.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` when the body contains anything besides whitespace.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Document locale, for example `en_US`.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Focus keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Comma-separated keyword synonyms.
    #[must_use]
    pub fn synonyms(&self) -> &str {
        &self.synonyms
    }

    /// Document title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Document URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Meta description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}
