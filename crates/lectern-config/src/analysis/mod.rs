//! Process-wide analysis configuration and its merge semantics.
//!
//! The controlling process sends partial configurations through `initialize`
//! requests. Each update is merged field by field into the current
//! [`Configuration`]; the fields it changed decide which scoring pipelines
//! must be rebuilt. Malformed values never fail the request: they are
//! skipped with a warning and the current value is kept.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use tracing::warn;

use crate::defaults::DEFAULT_LOCALE;

/// Tracing target for configuration merging.
const CONFIG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::analysis");

/// Options recognised in an `initialize` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "camelCase")]
pub enum ConfigField {
    /// Enables the readability pipeline.
    ContentAnalysisActive,
    /// Enables the SEO pipelines.
    KeywordAnalysisActive,
    /// Selects the stricter cornerstone thresholds.
    UseCornerstone,
    /// Selects the taxonomy variant of the SEO pipelines.
    UseTaxonomy,
    /// Adds the keyphrase distribution rule to the primary SEO pipeline.
    UseKeywordDistribution,
    /// Selects language-specific rule sets.
    Locale,
    /// Replaces the translation catalogue.
    Translations,
    /// Named precomputed research data.
    ResearchData,
    /// Query parameters appended to documentation links.
    DefaultQueryParams,
}

/// Fields whose change forces a readability pipeline rebuild.
pub const AFFECTS_READABILITY: &[ConfigField] = &[
    ConfigField::ContentAnalysisActive,
    ConfigField::UseCornerstone,
    ConfigField::Locale,
    ConfigField::Translations,
];

/// Fields whose change forces an SEO pipeline rebuild.
pub const AFFECTS_SEO: &[ConfigField] = &[
    ConfigField::KeywordAnalysisActive,
    ConfigField::UseCornerstone,
    ConfigField::UseTaxonomy,
    ConfigField::UseKeywordDistribution,
    ConfigField::Locale,
    ConfigField::Translations,
    ConfigField::ResearchData,
];

/// The scoring flags shared by every analysis in the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Whether the readability pipeline runs.
    pub content_analysis_active: bool,
    /// Whether the SEO pipelines run.
    pub keyword_analysis_active: bool,
    /// Whether cornerstone thresholds apply.
    pub use_cornerstone: bool,
    /// Whether the taxonomy variant of the SEO pipelines is used.
    pub use_taxonomy: bool,
    /// Whether the keyphrase distribution rule is added.
    pub use_keyword_distribution: bool,
    /// Active locale.
    pub locale: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            content_analysis_active: true,
            keyword_analysis_active: true,
            use_cornerstone: false,
            use_taxonomy: false,
            use_keyword_distribution: false,
            locale: DEFAULT_LOCALE.to_owned(),
        }
    }
}

/// Pipelines an update requires to be rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildPlan {
    /// Rebuild the readability pipeline.
    pub readability: bool,
    /// Rebuild the primary and related-keyword SEO pipelines.
    pub seo: bool,
}

/// A partial configuration read leniently from an `initialize` payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationUpdate {
    /// New `contentAnalysisActive`, if supplied.
    pub content_analysis_active: Option<bool>,
    /// New `keywordAnalysisActive`, if supplied.
    pub keyword_analysis_active: Option<bool>,
    /// New `useCornerstone`, if supplied.
    pub use_cornerstone: Option<bool>,
    /// New `useTaxonomy`, if supplied.
    pub use_taxonomy: Option<bool>,
    /// New `useKeywordDistribution`, if supplied.
    pub use_keyword_distribution: Option<bool>,
    /// New locale, if supplied.
    pub locale: Option<String>,
    /// Replacement translation catalogue.
    pub translations: Option<Value>,
    /// Research data keyed by research name.
    pub research_data: Option<Map<String, Value>>,
    /// Query parameters for documentation links.
    pub default_query_params: Option<Map<String, Value>>,
}

impl ConfigurationUpdate {
    /// Reads an update from an `initialize` payload.
    ///
    /// Unknown keys and values of the wrong type are ignored. A payload that
    /// is not an object yields an empty update.
    #[must_use]
    pub fn from_value(payload: &Value) -> Self {
        let mut update = Self::default();
        let Some(object) = payload.as_object() else {
            if !payload.is_null() {
                warn!(target: CONFIG_TARGET, "initialize payload is not an object; ignoring it");
            }
            return update;
        };

        for (key, value) in object {
            match ConfigField::from_str(key) {
                Ok(field) => update.apply(field, value),
                Err(_) => {
                    warn!(target: CONFIG_TARGET, key = key.as_str(), "ignoring unknown configuration key");
                }
            }
        }
        update
    }

    fn apply(&mut self, field: ConfigField, value: &Value) {
        let accepted = match field {
            ConfigField::ContentAnalysisActive => set_bool(&mut self.content_analysis_active, value),
            ConfigField::KeywordAnalysisActive => set_bool(&mut self.keyword_analysis_active, value),
            ConfigField::UseCornerstone => set_bool(&mut self.use_cornerstone, value),
            ConfigField::UseTaxonomy => set_bool(&mut self.use_taxonomy, value),
            ConfigField::UseKeywordDistribution => {
                set_bool(&mut self.use_keyword_distribution, value)
            }
            ConfigField::Locale => match value.as_str().map(str::trim) {
                Some(locale) if !locale.is_empty() => {
                    self.locale = Some(locale.to_owned());
                    true
                }
                _ => false,
            },
            ConfigField::Translations => {
                if value.is_null() {
                    false
                } else {
                    self.translations = Some(value.clone());
                    true
                }
            }
            ConfigField::ResearchData => set_object(&mut self.research_data, value),
            ConfigField::DefaultQueryParams => set_object(&mut self.default_query_params, value),
        };
        if !accepted {
            warn!(
                target: CONFIG_TARGET,
                field = %field,
                "ignoring configuration value of unexpected type"
            );
        }
    }
}

fn set_bool(slot: &mut Option<bool>, value: &Value) -> bool {
    match value.as_bool() {
        Some(flag) => {
            *slot = Some(flag);
            true
        }
        None => false,
    }
}

fn set_object(slot: &mut Option<Map<String, Value>>, value: &Value) -> bool {
    match value.as_object() {
        Some(object) => {
            *slot = Some(object.clone());
            true
        }
        None => false,
    }
}

fn differs<T: PartialEq>(proposed: Option<&T>, current: &T) -> bool {
    proposed.is_some_and(|value| value != current)
}

impl Configuration {
    /// Lists the fields the update would change.
    ///
    /// Scalar fields count only when their value differs; translations and
    /// research data count whenever present because they are reloads.
    #[must_use]
    pub fn changed_fields(&self, update: &ConfigurationUpdate) -> Vec<ConfigField> {
        let candidates = [
            (
                ConfigField::ContentAnalysisActive,
                differs(
                    update.content_analysis_active.as_ref(),
                    &self.content_analysis_active,
                ),
            ),
            (
                ConfigField::KeywordAnalysisActive,
                differs(
                    update.keyword_analysis_active.as_ref(),
                    &self.keyword_analysis_active,
                ),
            ),
            (
                ConfigField::UseCornerstone,
                differs(update.use_cornerstone.as_ref(), &self.use_cornerstone),
            ),
            (
                ConfigField::UseTaxonomy,
                differs(update.use_taxonomy.as_ref(), &self.use_taxonomy),
            ),
            (
                ConfigField::UseKeywordDistribution,
                differs(
                    update.use_keyword_distribution.as_ref(),
                    &self.use_keyword_distribution,
                ),
            ),
            (
                ConfigField::Locale,
                differs(update.locale.as_ref(), &self.locale),
            ),
            (ConfigField::Translations, update.translations.is_some()),
            (ConfigField::ResearchData, update.research_data.is_some()),
            (
                ConfigField::DefaultQueryParams,
                update.default_query_params.is_some(),
            ),
        ];
        candidates
            .into_iter()
            .filter_map(|(field, changed)| changed.then_some(field))
            .collect()
    }

    /// Decides which pipelines the update requires to be rebuilt.
    #[must_use]
    pub fn plan(&self, update: &ConfigurationUpdate) -> RebuildPlan {
        let changed = self.changed_fields(update);
        RebuildPlan {
            readability: changed.iter().any(|field| AFFECTS_READABILITY.contains(field)),
            seo: changed.iter().any(|field| AFFECTS_SEO.contains(field)),
        }
    }

    /// Merges the scalar fields of the update into this configuration.
    pub fn merge(&mut self, update: &ConfigurationUpdate) {
        if let Some(flag) = update.content_analysis_active {
            self.content_analysis_active = flag;
        }
        if let Some(flag) = update.keyword_analysis_active {
            self.keyword_analysis_active = flag;
        }
        if let Some(flag) = update.use_cornerstone {
            self.use_cornerstone = flag;
        }
        if let Some(flag) = update.use_taxonomy {
            self.use_taxonomy = flag;
        }
        if let Some(flag) = update.use_keyword_distribution {
            self.use_keyword_distribution = flag;
        }
        if let Some(locale) = &update.locale {
            self.locale.clone_from(locale);
        }
    }
}

#[cfg(test)]
mod tests;
