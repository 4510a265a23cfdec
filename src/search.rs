use serde::Serialize;

use crate::{
    entry::{CollectionKind, EntryId, ReferenceEntry},
    error::Result,
    matcher::{MatchConfig, Matcher, ScoredEntry},
    store::EntryStore,
};

/// Parameters for one search over one collection.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub collection: CollectionKind,
    /// Maximum number of results, ignored when `all` is set.
    pub limit: usize,
    pub all: bool,
    pub config: MatchConfig,
}

/// A ranked, owned search result ready for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub rank: usize,
    pub collection: CollectionKind,
    pub id: EntryId,
    pub score: usize,
    pub matched_terms: Vec<String>,
    pub tag_bonus_applied: bool,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author: String,
}

impl FinalResult {
    fn from_scored(
        rank: usize,
        collection: CollectionKind,
        scored: ScoredEntry<'_>,
    ) -> Self {
        let entry: &ReferenceEntry = scored.entry;
        Self {
            rank,
            collection,
            id: entry.id,
            score: scored.match_count,
            matched_terms: scored.matched_terms,
            tag_bonus_applied: scored.tag_bonus_applied,
            title: entry.title.clone(),
            body: entry.body.clone(),
            tags: entry.tags.clone(),
            author: entry.author.clone(),
        }
    }
}

/// Execute a search over one collection.
///
/// 1. Snapshot the collection's live entries
/// 2. Match and rank them against the query
/// 3. Limit to `limit` results unless `all` is set
pub fn execute_search(
    params: &SearchParams,
    store: &EntryStore,
) -> Result<Vec<FinalResult>> {
    let entries = store.list(params.collection)?;
    Ok(rank_entries(params, &entries))
}

/// Match and limit an already loaded collection snapshot.
pub fn rank_entries(
    params: &SearchParams,
    entries: &[ReferenceEntry],
) -> Vec<FinalResult> {
    let matcher = Matcher::new(params.config);
    let scored = matcher.match_entries(&params.query, entries);

    let limit = if params.all { scored.len() } else { params.limit };
    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, s)| FinalResult::from_scored(i + 1, params.collection, s))
        .collect()
}

/// Format one collection's results for human-readable terminal output.
pub fn format_human(collection: CollectionKind, results: &[FinalResult]) {
    println!("== {} ==", collection.label());
    if results.is_empty() {
        println!("No matches found.\n");
        return;
    }

    for r in results {
        let marker = if r.tag_bonus_applied { " *" } else { "" };
        println!("{:>3}. [{}]{marker} {} {}", r.rank, r.score, r.id, r.title);
        if !r.tags.is_empty() {
            println!("     tags: {}", r.tags.join(", "));
        }
        println!("     matched: {}", r.matched_terms.join(", "));
        for line in r.body.lines() {
            println!("     | {line}");
        }
    }
    println!("\n{} result(s)\n", results.len());
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<'a> {
    pub query: &'a str,
    pub result_count: usize,
    pub results: &'a [FinalResult],
}

/// Format results as JSON output.
pub fn format_json(query: &str, results: &[FinalResult]) -> Result<()> {
    let response = SearchResponse {
        query,
        result_count: results.len(),
        results,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Format results as `collection:#id` references (one per line).
pub fn format_ids(results: &[FinalResult]) {
    for r in results {
        println!("{}:{}", r.collection, r.id);
    }
}
