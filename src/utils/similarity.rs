//! Title similarity ranking of repository candidates.

use std::cmp::Ordering;
use strsim::normalized_levenshtein;

use crate::config::RankingConfig;
use crate::models::CandidateEntry;

/// Highest possible score, given to identical titles
pub const MAX_SCORE: f64 = 100.0;

/// Similarity of two titles on a 0..=100 scale.
///
/// Titles are compared case-insensitively with whitespace runs collapsed,
/// since feed titles carry the line breaks of the submission form.
pub fn title_similarity(target: &str, candidate: &str) -> f64 {
    let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    normalized_levenshtein(&normalize(target), &normalize(candidate)) * MAX_SCORE
}

/// Reorders candidates by title closeness to the parsed reference title.
#[derive(Debug, Clone, Default)]
pub struct SimilarityRanker {
    min_similarity: f64,
}

impl SimilarityRanker {
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            min_similarity: config.min_similarity,
        }
    }

    /// Score and sort `candidates` against `target`.
    ///
    /// Without a target title the repository order is returned untouched.
    /// With one, candidates below the configured minimum are dropped.
    pub fn rank(&self, target: Option<&str>, candidates: Vec<CandidateEntry>) -> Vec<CandidateEntry> {
        let Some(target) = target else {
            return candidates;
        };

        let scored: Vec<CandidateEntry> = candidates
            .into_iter()
            .map(|mut entry| {
                entry.similarity = Some(title_similarity(target, &entry.title));
                entry
            })
            .collect();

        let total = scored.len();
        let kept: Vec<CandidateEntry> = sort_by_score(scored)
            .into_iter()
            .filter(|e| e.similarity.unwrap_or(MAX_SCORE) >= self.min_similarity)
            .collect();

        if kept.len() < total {
            tracing::warn!(
                "{} candidate(s) below similarity {:.1} hidden",
                total - kept.len(),
                self.min_similarity
            );
        }
        kept
    }
}

/// Stable descending sort on the similarity score.
pub fn sort_by_score(mut entries: Vec<CandidateEntry>) -> Vec<CandidateEntry> {
    entries.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    entries
}
