//! Defensive local ranking.
//!
//! The upstream index returns hits in its own relevance order, but that
//! order is never trusted as authoritative: the relay re-sorts by
//! descending score (stable, so upstream order breaks ties) and only
//! then truncates to the display cap.

use sr_domain::hit::SearchHit;

/// Stable sort by descending score. Equal scores keep their upstream
/// relative order.
pub fn sort_by_score_desc(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

/// Re-sort and truncate to the top `cap` hits.
pub fn rank_and_cap(mut hits: Vec<SearchHit>, cap: usize) -> Vec<SearchHit> {
    sort_by_score_desc(&mut hits);
    hits.truncate(cap);
    hits
}
