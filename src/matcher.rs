//! Keyword relevance matching for quick fixes and guides.
//!
//! An entry is relevant to a query when enough of the query's significant
//! terms occur in the entry's text. Short queries must be covered
//! completely; longer ones need a fixed floor of [`MAX_REQUIRED_MATCHES`]
//! matched terms. Entries whose tags appear in the query also get a score
//! bonus. Tags can help an entry in, never keep it out.
//!
//! Matching is a pure function of the query and the entry slice: no
//! state is kept between calls and no input can make it fail.

use tracing::debug;

use crate::{entry::ReferenceEntry, tokenize::significant_terms};

/// Bonus added to an entry's score when one of its tags is in the query.
pub const DEFAULT_TAG_BONUS: usize = 10;

/// Upper bound on the number of matched terms an entry needs.
pub const MAX_REQUIRED_MATCHES: usize = 3;

/// Number of matched significant terms required for admission, given the
/// number of significant terms in the query.
///
/// | query terms | required |
/// |-------------|----------|
/// | 0           | 0 (nothing is matched at all) |
/// | 1           | 1        |
/// | 2           | 2        |
/// | 3 or more   | 3        |
pub fn required_matches(query_terms: usize) -> usize {
    query_terms.min(MAX_REQUIRED_MATCHES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub tag_bonus: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tag_bonus: DEFAULT_TAG_BONUS,
        }
    }
}

/// An entry admitted by the matcher, with the evidence for its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredEntry<'a> {
    pub entry: &'a ReferenceEntry,
    /// Total score: matched terms plus the tag bonus when applied.
    pub match_count: usize,
    /// Significant query terms found in the entry, in query order.
    pub matched_terms: Vec<String>,
    pub tag_bonus_applied: bool,
}

impl ScoredEntry<'_> {
    /// Matched terms without the tag bonus.
    pub fn term_matches(&self) -> usize {
        self.matched_terms.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Rank `entries` by relevance to `query`.
    ///
    /// Returns only entries meeting [`required_matches`], sorted by
    /// descending score. Entries with equal scores keep their order from
    /// `entries`. The result is never truncated.
    pub fn match_entries<'a>(
        &self,
        query: &str,
        entries: &'a [ReferenceEntry],
    ) -> Vec<ScoredEntry<'a>> {
        let terms = significant_terms(query);
        if terms.is_empty() {
            debug!(query, "no significant terms in query");
            return Vec::new();
        }

        let required = required_matches(terms.len());
        let query_lower = query.to_lowercase();

        let mut scored: Vec<ScoredEntry<'a>> = entries
            .iter()
            .filter_map(|entry| {
                let haystack = entry.haystack();
                let matched_terms: Vec<String> = terms
                    .iter()
                    .filter(|term| haystack.contains(term.as_str()))
                    .cloned()
                    .collect();

                if matched_terms.len() < required {
                    return None;
                }

                let tag_bonus_applied = has_tag_in(entry, &query_lower);
                let bonus = if tag_bonus_applied {
                    self.config.tag_bonus
                } else {
                    0
                };

                Some(ScoredEntry {
                    entry,
                    match_count: matched_terms.len().saturating_add(bonus),
                    matched_terms,
                    tag_bonus_applied,
                })
            })
            .collect();

        // `sort_by` is stable, which preserves collection order on ties.
        scored.sort_by(|a, b| b.match_count.cmp(&a.match_count));

        debug!(
            terms = terms.len(),
            required,
            candidates = entries.len(),
            matched = scored.len(),
            "keyword match"
        );

        scored
    }
}

/// Match with the default configuration.
pub fn match_entries<'a>(
    query: &str,
    entries: &'a [ReferenceEntry],
) -> Vec<ScoredEntry<'a>> {
    Matcher::default().match_entries(query, entries)
}

/// Whether any of the entry's tags occurs verbatim in the lowercased query.
fn has_tag_in(entry: &ReferenceEntry, query_lower: &str) -> bool {
    entry.tags.iter().any(|tag| {
        let tag = tag.trim().to_lowercase();
        !tag.is_empty() && query_lower.contains(&tag)
    })
}
