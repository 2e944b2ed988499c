//! Prefix filtering of candidate lists.

use super::Suggestion;

/// Keep, in original order, every candidate whose text starts with `word`
/// (case-insensitive). An empty word returns the list unchanged.
pub fn filter_prefix(candidates: Vec<Suggestion>, word: &str) -> Vec<Suggestion> {
    if word.is_empty() {
        return candidates;
    }
    let word = word.to_lowercase();
    candidates
        .into_iter()
        .filter(|s| s.text.to_lowercase().starts_with(&word))
        .collect()
}
