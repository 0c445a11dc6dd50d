//! Unit tests for analysis configuration merging.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn current() -> Configuration {
    Configuration::default()
}

#[test]
fn defaults_enable_both_pipelines() {
    let config = Configuration::default();
    assert!(config.content_analysis_active);
    assert!(config.keyword_analysis_active);
    assert!(!config.use_cornerstone);
    assert_eq!(config.locale, DEFAULT_LOCALE);
}

#[test]
fn field_names_follow_wire_casing() {
    assert_eq!(ConfigField::UseKeywordDistribution.to_string(), "useKeywordDistribution");
    assert_eq!(
        ConfigField::from_str("researchData").expect("known key"),
        ConfigField::ResearchData
    );
}

#[test]
fn update_ignores_wrong_types_and_unknown_keys() {
    let update = ConfigurationUpdate::from_value(&json!({
        "contentAnalysisActive": "yes",
        "keywordAnalysisActive": false,
        "locale": 7,
        "colour": "blue",
        "researchData": [1, 2],
    }));
    assert_eq!(update.content_analysis_active, None);
    assert_eq!(update.keyword_analysis_active, Some(false));
    assert_eq!(update.locale, None);
    assert_eq!(update.research_data, None);
}

#[rstest]
#[case::null(json!(null))]
#[case::array(json!([true]))]
#[case::string(json!("contentAnalysisActive"))]
fn non_object_payload_is_an_empty_update(#[case] payload: serde_json::Value) {
    assert_eq!(ConfigurationUpdate::from_value(&payload), ConfigurationUpdate::default());
}

#[rstest]
#[case::nothing(json!({}), false, false)]
#[case::same_values(json!({"contentAnalysisActive": true, "locale": "en_US"}), false, false)]
#[case::content_flag(json!({"contentAnalysisActive": false}), true, false)]
#[case::keyword_flag(json!({"keywordAnalysisActive": false}), false, true)]
#[case::cornerstone(json!({"useCornerstone": true}), true, true)]
#[case::taxonomy(json!({"useTaxonomy": true}), false, true)]
#[case::distribution(json!({"useKeywordDistribution": true}), false, true)]
#[case::locale(json!({"locale": "de_DE"}), true, true)]
#[case::translations(json!({"translations": {}}), true, true)]
#[case::research_data(json!({"researchData": {"morphology": {}}}), false, true)]
#[case::query_params(json!({"defaultQueryParams": {"ref": "x"}}), false, false)]
fn plan_follows_affected_sets(
    current: Configuration,
    #[case] payload: serde_json::Value,
    #[case] readability: bool,
    #[case] seo: bool,
) {
    let update = ConfigurationUpdate::from_value(&payload);
    assert_eq!(current.plan(&update), RebuildPlan { readability, seo });
}

#[rstest]
fn merge_is_shallow(mut current: Configuration) {
    let update = ConfigurationUpdate::from_value(&json!({
        "useCornerstone": true,
        "locale": "nl_NL",
    }));
    current.merge(&update);
    assert!(current.use_cornerstone);
    assert_eq!(current.locale, "nl_NL");
    assert!(current.content_analysis_active, "untouched fields keep their value");
}

#[rstest]
fn changed_fields_lists_only_differences(current: Configuration) {
    let update = ConfigurationUpdate::from_value(&json!({
        "keywordAnalysisActive": true,
        "useTaxonomy": true,
        "translations": {"domain": "x"},
    }));
    assert_eq!(
        current.changed_fields(&update),
        vec![ConfigField::UseTaxonomy, ConfigField::Translations]
    );
}
