//! Exact top-K ranking by cosine similarity.
//!
//! The store delegates all scoring here so the ranking contract lives in
//! one place:
//!
//! 1. Score every entry against the query vector (linear scan).
//! 2. Stable-sort by score, descending. Entries with equal scores keep
//!    their insertion order, so the earliest inserted wins ties.
//! 3. Truncate to `top_k`. A `top_k` larger than the entry count returns
//!    every entry, unpadded.

use serde::Serialize;

use crate::embedding::cosine_similarity;
use crate::error::Result;
use crate::store::{SourceRef, VectorEntry};

/// A ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Owner id of the matched entry (`route`, `route#c0`, `route#a1`).
    pub owner_id: String,
    /// What the entry points back to.
    pub source: SourceRef,
    /// Text that was embedded for this entry.
    pub summary: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Score `entries` against `query` and keep the best `top_k`.
///
/// `entries` must be in insertion order. Every entry must have the same
/// length as `query`; a mismatch surfaces as a usage error.
pub fn rank_top_k(query: &[f32], entries: &[VectorEntry], top_k: usize) -> Result<Vec<SearchHit>> {
    if top_k == 0 || entries.is_empty() {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(usize, f32)> = Vec::with_capacity(entries.len());
    for (pos, entry) in entries.iter().enumerate() {
        scored.push((pos, cosine_similarity(query, &entry.vector)?));
    }

    // `sort_by` is stable; ties stay in insertion order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);

    Ok(scored
        .into_iter()
        .map(|(pos, score)| {
            let entry = &entries[pos];
            SearchHit {
                owner_id: entry.owner_id.clone(),
                source: entry.source.clone(),
                summary: entry.summary.clone(),
                score,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, vector: Vec<f32>) -> VectorEntry {
        VectorEntry {
            owner_id: id.to_string(),
            vector,
            source: SourceRef::Route {
                route: id.to_string(),
            },
            summary: String::new(),
        }
    }

    #[test]
    fn test_sorted_descending() {
        let entries = vec![
            entry("low", vec![0.0, 1.0]),
            entry("high", vec![1.0, 0.0]),
            entry("mid", vec![0.6, 0.8]),
        ];
        let hits = rank_top_k(&[1.0, 0.0], &entries, 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.owner_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let entries = vec![
            entry("first", vec![1.0, 0.0]),
            entry("other", vec![0.0, 1.0]),
            entry("second", vec![1.0, 0.0]),
            entry("third", vec![2.0, 0.0]),
        ];
        let hits = rank_top_k(&[1.0, 0.0], &entries, 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.owner_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_top_k_larger_than_entries() {
        let entries = vec![entry("a", vec![1.0]), entry("b", vec![-1.0])];
        let hits = rank_top_k(&[1.0], &entries, 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert!((hits[1].score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_top_k() {
        let entries = vec![entry("a", vec![1.0])];
        assert!(rank_top_k(&[1.0], &entries, 0).unwrap().is_empty());
    }

    #[test]
    fn test_length_mismatch_fails() {
        let entries = vec![entry("a", vec![1.0, 0.0])];
        assert!(rank_top_k(&[1.0], &entries, 1).is_err());
    }
}
