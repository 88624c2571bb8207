use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed weights of the three measures in the combined score.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreWeights {
    pub jaccard: f64,
    pub cosine_basic: f64,
    pub tfidf: f64,
}

/// `final = 0.3 * jaccard + 0.2 * cosine_basic + 0.5 * tfidf`.
pub const SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    jaccard: 0.3,
    cosine_basic: 0.2,
    tfidf: 0.5,
};

impl ScoreWeights {
    /// Weighted sum of the three measures, clamped to [0, 1].
    pub fn combine(&self, jaccard: f64, cosine_basic: f64, tfidf: f64) -> f64 {
        clamp_unit(self.jaccard * jaccard + self.cosine_basic * cosine_basic + self.tfidf * tfidf)
    }
}

/// Converts a [0, 1] score to a percentage rounded to two decimals.
///
/// Rounds half away from zero.
///
/// ```rust
/// use matcher::to_percentage;
///
/// assert_eq!(to_percentage(0.853), 85.3);
/// assert_eq!(to_percentage(1.0), 100.0);
/// assert_eq!(to_percentage(2.0 / 3.0), 66.67);
/// ```
pub fn to_percentage(score: f64) -> f64 {
    (score * 100.0 * 100.0).round() / 100.0
}

/// Clamps into [0, 1]; NaN maps to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Outcome of scoring one pair of documents. All scores are in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimilarityResult {
    pub jaccard: f64,
    pub cosine_basic: f64,
    pub tfidf_cosine: f64,
    pub final_score: f64,
    /// True when the TF-IDF measure failed and `tfidf_cosine` holds the
    /// Jaccard score instead.
    pub weighted_fallback: bool,
    /// Token count of the first document, duplicates included.
    pub total_words_text1: usize,
    pub total_words_text2: usize,
    /// Number of distinct words present in both documents.
    pub common_words_count: usize,
}

impl SimilarityResult {
    pub fn final_percentage(&self) -> f64 {
        to_percentage(self.final_score)
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Why the TF-IDF measure could not produce a score.
///
/// Never escapes the engine: [`SimilarityEngine::score`](crate::SimilarityEngine::score)
/// substitutes the Jaccard score.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WeightedScoreError {
    #[error("vocabulary is empty")]
    EmptyVocabulary,
    #[error("weighted cosine is not a finite number")]
    NonFinite,
}
