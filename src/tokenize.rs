//! Query analysis: turning free text into significant terms.

/// Tokens with this many characters or fewer are never significant.
pub const MIN_TERM_CHARS: usize = 2;

/// Words that carry no meaning for matching.
///
/// Only words longer than [`MIN_TERM_CHARS`] are listed since shorter
/// tokens are dropped before this list is consulted. Kept sorted for
/// binary search.
pub const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "and", "any", "are",
    "because", "been", "before", "being", "below", "between", "both", "but",
    "can", "cannot", "could", "did", "does", "doing", "done", "down",
    "during", "each", "few", "for", "from", "further", "get", "gets",
    "getting", "got", "had", "has", "have", "having", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "into", "its", "itself",
    "just", "keep", "keeps", "let", "make", "makes", "may", "might", "more",
    "most", "much", "must", "myself", "need", "needs", "nor", "not", "now",
    "off", "once", "only", "onto", "other", "our", "ours", "ourselves",
    "out", "over", "own", "same", "she", "should", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "too", "under", "until",
    "very", "was", "way", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "within", "without", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Extract the significant terms of a query.
///
/// Splits on whitespace, lowercases, trims punctuation from both ends of
/// each token, then drops short tokens and stop words. Duplicates are
/// removed keeping the first occurrence, so the result behaves as a set
/// with a stable order.
///
/// # Examples
///
/// ```
/// use quickfix::tokenize::significant_terms;
///
/// assert_eq!(
///     significant_terms("How do I reset the Scantronic panel?"),
///     vec!["reset", "scantronic", "panel"],
/// );
/// assert!(significant_terms("is it on").is_empty());
/// ```
pub fn significant_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    for raw in query.split_whitespace() {
        let token = raw
            .trim_matches(|c: char| c.is_ascii_punctuation())
            .to_lowercase();

        if token.chars().count() <= MIN_TERM_CHARS || is_stop_word(&token) {
            continue;
        }
        if !terms.contains(&token) {
            terms.push(token);
        }
    }

    terms
}

/// Keywords for an entry whose author did not list any.
pub fn derive_keywords(title: &str, body: &str) -> Vec<String> {
    significant_terms(&format!("{title} {body}"))
}
