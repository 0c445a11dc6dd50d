//! Unit tests for fingerprints and the result cache.

use rstest::{fixture, rstest};

use super::*;

fn paper() -> Paper {
    Paper::new("Some text. More text.")
        .with_keyword("text", "words")
        .with_title("A title")
}

fn related(key: &str) -> Dimension {
    Dimension::Seo(key.to_owned())
}

fn requested(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|key| (*key).to_owned()).collect()
}

#[fixture]
fn populated() -> ResultCache {
    let mut cache = ResultCache::new();
    let fingerprint = Fingerprint::seo(&paper());
    for key in ["", "x", "y"] {
        cache.store(&related(key), fingerprint, 1, Vec::new(), Some(50));
    }
    cache
}

#[test]
fn readability_ignores_keyword_changes() {
    let base = paper();
    let changed = base.for_keyword("other", "alt");
    assert_eq!(Fingerprint::readability(&base), Fingerprint::readability(&changed));
    assert_ne!(Fingerprint::seo(&base), Fingerprint::seo(&changed));
}

#[rstest]
#[case::text(Paper::new("Other text."))]
#[case::locale(paper().with_locale("de_DE"))]
#[case::synonyms(paper().with_keyword("text", "phrases"))]
#[case::url(paper().with_url("https://example.test/a"))]
#[case::description(paper().with_description("Meta"))]
fn seo_fingerprint_tracks_each_field(#[case] changed: Paper) {
    assert_ne!(Fingerprint::seo(&paper()), Fingerprint::seo(&changed));
}

#[test]
fn field_boundaries_are_significant() {
    let left = Paper::new("ab").with_locale("c");
    let right = Paper::new("a").with_locale("bc");
    assert_ne!(Fingerprint::readability(&left), Fingerprint::readability(&right));
}

#[test]
fn fresh_requires_matching_fingerprint_and_generation() {
    let mut cache = ResultCache::new();
    let fingerprint = Fingerprint::readability(&paper());
    cache.store(&Dimension::Readability, fingerprint, 4, Vec::new(), Some(80));

    assert!(cache.fresh(&Dimension::Readability, fingerprint, 4).is_some());
    assert!(cache.fresh(&Dimension::Readability, fingerprint, 5).is_none());
    let other = Fingerprint::readability(&Paper::new("different"));
    assert!(cache.fresh(&Dimension::Readability, other, 4).is_none());
}

#[rstest]
fn invalidate_keeps_entries_but_marks_them_stale(mut populated: ResultCache) {
    let fingerprint = Fingerprint::seo(&paper());
    populated.invalidate();
    assert!(populated.entry(&related("x")).is_some());
    assert!(populated.fresh(&related("x"), fingerprint, 1).is_none());

    populated.store(&related("x"), fingerprint, 1, Vec::new(), Some(10));
    assert!(populated.fresh(&related("x"), fingerprint, 1).is_some());
}

#[rstest]
fn pruning_removes_unrequested_related_keywords(mut populated: ResultCache) {
    assert_eq!(populated.prune_related(&requested(&["x"])), 1);
    let keys: Vec<&str> = populated.seo_entries().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["", "x"]);
}

#[rstest]
fn empty_request_leaves_related_keywords_alone(mut populated: ResultCache) {
    assert_eq!(populated.prune_related(&BTreeSet::new()), 0);
    assert_eq!(populated.related_count(), 2);
}

#[rstest]
fn dropping_related_keeps_the_primary_entry(mut populated: ResultCache) {
    assert_eq!(populated.drop_related(), 2);
    assert_eq!(populated.related_count(), 0);
    assert!(populated.entry(&Dimension::primary()).is_some());
    assert_eq!(populated.drop_related(), 0);
}

#[rstest]
fn primary_entry_survives_pruning(mut populated: ResultCache) {
    populated.prune_related(&requested(&["z"]));
    assert!(populated.entry(&Dimension::primary()).is_some());
    assert_eq!(populated.related_count(), 0);
}

#[rstest]
fn clear_discards_everything(mut populated: ResultCache) {
    populated.clear();
    assert_eq!(populated.seo_entries().count(), 0);
    assert!(populated.entry(&Dimension::Readability).is_none());
}

#[test]
fn scored_view_serialises_null_score() {
    let mut cache = ResultCache::new();
    let entry = cache.store(
        &Dimension::Readability,
        Fingerprint::readability(&paper()),
        1,
        Vec::new(),
        None,
    );
    let value = serde_json::to_value(entry.scored()).expect("serialise");
    assert_eq!(value, serde_json::json!({"results": [], "score": null}));
}
