//! Relevance cut-off over scored matches.

use crate::api_types::SearchMatch;

/// Minimum similarity for a match to count as relevant.
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Keeps matches with `score >= threshold`, preserving order.
pub fn filter_relevant(matches: Vec<SearchMatch>, threshold: f32) -> Vec<SearchMatch> {
    matches.into_iter().filter(|m| m.score >= threshold).collect()
}
