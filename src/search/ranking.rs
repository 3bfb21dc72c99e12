//! Merge and post-processing rules shared by every search mode.

use std::collections::HashSet;

use crate::search::query::SearchResult;

/// Merges exact and fuzzy results for hybrid search.
///
/// Exact results are kept as they are. A fuzzy result is only added when its
/// entry is not already present, so a literal hit is never replaced by a looser
/// one. The merged list is sorted by score, descending; the sort is stable so
/// exact results stay ahead of equally scored fuzzy ones.
pub fn merge_hybrid(exact: Vec<SearchResult>, fuzzy: Vec<SearchResult>) -> Vec<SearchResult> {
    let seen: HashSet<String> = exact.iter().map(|r| r.entry.id.clone()).collect();
    let mut merged = exact;
    merged.extend(fuzzy.into_iter().filter(|r| !seen.contains(&r.entry.id)));
    sort_by_score(&mut merged);
    merged
}

/// Stable sort by score, best first.
pub fn sort_by_score(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Applies the caller's translation filter, then the result cap.
pub fn finalize(mut results: Vec<SearchResult>, include_empty: bool, limit: usize) -> Vec<SearchResult> {
    if !include_empty {
        results.retain(|r| r.entry.has_translations);
    }
    results.truncate(limit);
    results
}
