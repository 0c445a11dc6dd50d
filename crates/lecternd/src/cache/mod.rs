//! Incremental result cache.
//!
//! One [`CacheEntry`] is kept per scoring dimension: readability, the primary
//! SEO keyword (key `""`), and each related keyword. An entry is reused only
//! while the dimension's [`Fingerprint`] matches, the pipeline that produced
//! it has not been rebuilt, and the cache has not been invalidated since it
//! was stored.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use lectern_plugins::{AssessmentResult, Paper};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Tracing target for cache decisions.
pub(crate) const CACHE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::cache");

/// Key of the primary SEO dimension.
pub const PRIMARY_KEY: &str = "";

/// Digest of the document fields a dimension depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Readability depends on text and locale.
    #[must_use]
    pub fn readability(paper: &Paper) -> Self {
        Self::of(&[paper.text(), paper.locale()])
    }

    /// SEO depends on text, locale, keyword, synonyms and the metadata SEO
    /// rules read.
    #[must_use]
    pub fn seo(paper: &Paper) -> Self {
        Self::of(&[
            paper.text(),
            paper.locale(),
            paper.keyword(),
            paper.synonyms(),
            paper.title(),
            paper.url(),
            paper.description(),
        ])
    }

    fn of(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for field in fields {
            // Length prefixes keep ("ab", "c") and ("a", "bc") apart.
            hasher.update(field.len().to_string().as_bytes());
            hasher.update(b":");
            hasher.update(field.as_bytes());
        }
        Self(hasher.finalize().into())
    }
}

/// A scoring dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    /// The readability dimension.
    Readability,
    /// An SEO dimension; [`PRIMARY_KEY`] for the main keyword.
    Seo(String),
}

impl Dimension {
    /// The primary SEO dimension.
    #[must_use]
    pub fn primary() -> Self {
        Self::Seo(PRIMARY_KEY.to_owned())
    }
}

/// Stored outcome for one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    fingerprint: Fingerprint,
    results: Vec<AssessmentResult>,
    score: Option<u32>,
    generation: u64,
    epoch: u64,
}

/// Reply view of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredResults<'a> {
    /// Per-rule results.
    pub results: &'a [AssessmentResult],
    /// Overall score, `null` when no rule applied.
    pub score: Option<u32>,
}

impl CacheEntry {
    /// Per-rule results.
    #[must_use]
    pub fn results(&self) -> &[AssessmentResult] {
        &self.results
    }

    /// Overall score.
    #[must_use]
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    /// Generation of the pipeline that produced the entry.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Serialisable view used in replies.
    #[must_use]
    pub fn scored(&self) -> ScoredResults<'_> {
        ScoredResults {
            results: &self.results,
            score: self.score,
        }
    }
}

/// Per-dimension cache with pruning of related keywords.
#[derive(Debug, Default)]
pub struct ResultCache {
    readability: Option<CacheEntry>,
    seo: BTreeMap<String, CacheEntry>,
    epoch: u64,
}

impl ResultCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `dimension` if it is still valid for the given
    /// fingerprint and pipeline generation.
    #[must_use]
    pub fn fresh(
        &self,
        dimension: &Dimension,
        fingerprint: Fingerprint,
        generation: u64,
    ) -> Option<&CacheEntry> {
        self.entry(dimension).filter(|entry| {
            entry.fingerprint == fingerprint
                && entry.generation == generation
                && entry.epoch == self.epoch
        })
    }

    /// Stores a freshly computed entry and returns it.
    pub fn store(
        &mut self,
        dimension: &Dimension,
        fingerprint: Fingerprint,
        generation: u64,
        results: Vec<AssessmentResult>,
        score: Option<u32>,
    ) -> &CacheEntry {
        let entry = CacheEntry {
            fingerprint,
            results,
            score,
            generation,
            epoch: self.epoch,
        };
        debug!(target: CACHE_TARGET, ?dimension, generation, "cache entry stored");
        match dimension {
            Dimension::Readability => self.readability.insert(entry),
            Dimension::Seo(key) => match self.seo.entry(key.clone()) {
                Entry::Occupied(mut slot) => {
                    slot.insert(entry);
                    slot.into_mut()
                }
                Entry::Vacant(slot) => slot.insert(entry),
            },
        }
    }

    /// Looks up an entry regardless of freshness.
    #[must_use]
    pub fn entry(&self, dimension: &Dimension) -> Option<&CacheEntry> {
        match dimension {
            Dimension::Readability => self.readability.as_ref(),
            Dimension::Seo(key) => self.seo.get(key),
        }
    }

    /// Iterates SEO entries in key order; the primary entry comes first.
    pub fn seo_entries(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.seo.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of related-keyword entries held.
    #[must_use]
    pub fn related_count(&self) -> usize {
        self.seo.keys().filter(|key| !key.is_empty()).count()
    }

    /// Drops related-keyword entries not in `requested`.
    ///
    /// An empty `requested` set leaves every entry untouched. Returns the
    /// number of entries removed.
    pub fn prune_related(&mut self, requested: &BTreeSet<String>) -> usize {
        if requested.is_empty() {
            return 0;
        }
        let before = self.seo.len();
        self.seo
            .retain(|key, _| key.is_empty() || requested.contains(key));
        let removed = before - self.seo.len();
        if removed > 0 {
            debug!(target: CACHE_TARGET, removed, "pruned related keyword entries");
        }
        removed
    }

    /// Drops every related-keyword entry, keeping the primary one.
    ///
    /// Returns the number of entries removed.
    pub fn drop_related(&mut self) -> usize {
        let before = self.seo.len();
        self.seo.retain(|key, _| key.is_empty());
        let removed = before - self.seo.len();
        if removed > 0 {
            debug!(target: CACHE_TARGET, removed, "dropped related keyword entries");
        }
        removed
    }

    /// Marks every entry stale without discarding it.
    ///
    /// Stale entries are still reported for dimensions that are not
    /// requested again, but are recomputed before reuse.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        debug!(target: CACHE_TARGET, epoch = self.epoch, "cache invalidated");
    }

    /// Discards every entry.
    pub fn clear(&mut self) {
        self.readability = None;
        self.seo.clear();
        self.invalidate();
    }
}

#[cfg(test)]
mod tests;
