use std::collections::{BTreeMap, BTreeSet};

use canonical::NormalizedDocument;
use serde::{Deserialize, Serialize};

use crate::types::{clamp_unit, MatchError, SimilarityResult, WeightedScoreError, SCORE_WEIGHTS};

#[cfg(test)]
mod tests;

/// Number of documents in every IDF computation: the scored pair.
const PAIR_DOCUMENTS: f64 = 2.0;

/// Tuning knobs for [`SimilarityEngine`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cap on the TF-IDF vocabulary: only the most frequent terms across
    /// both documents are kept. `None` keeps every term.
    #[serde(default = "EngineConfig::default_max_features")]
    pub max_features: Option<usize>,
}

impl EngineConfig {
    pub(crate) fn default_max_features() -> Option<usize> {
        Some(1000)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_features == Some(0) {
            return Err(MatchError::InvalidConfig(
                "max_features must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_features: Self::default_max_features(),
        }
    }
}

/// Scores pairs of normalized documents.
///
/// Stateless apart from its config; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    config: EngineConfig,
}

impl SimilarityEngine {
    pub fn new(config: EngineConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs all three measures and combines them with [`SCORE_WEIGHTS`].
    ///
    /// A failed TF-IDF measure is replaced by the Jaccard score and flagged
    /// in [`SimilarityResult::weighted_fallback`].
    pub fn score(&self, doc1: &NormalizedDocument, doc2: &NormalizedDocument) -> SimilarityResult {
        let set1 = doc1.token_set();
        let set2 = doc2.token_set();
        let common_words_count = set1.intersection(&set2).count();

        let jaccard = jaccard_sets(&set1, &set2);
        let cosine_basic = frequency_cosine(doc1, doc2);

        let (tfidf_cosine, weighted_fallback) =
            match tfidf_cosine(doc1, doc2, self.config.max_features) {
                Ok(score) => (score, false),
                Err(err) => {
                    tracing::warn!(error = %err, "tf-idf measure failed, using jaccard");
                    (jaccard, true)
                }
            };

        let final_score = SCORE_WEIGHTS.combine(jaccard, cosine_basic, tfidf_cosine);

        tracing::debug!(
            jaccard,
            cosine_basic,
            tfidf_cosine,
            final_score,
            weighted_fallback,
            "scored pair"
        );

        SimilarityResult {
            jaccard,
            cosine_basic,
            tfidf_cosine,
            final_score,
            weighted_fallback,
            total_words_text1: doc1.len(),
            total_words_text2: doc2.len(),
            common_words_count,
        }
    }

    pub fn jaccard(&self, doc1: &NormalizedDocument, doc2: &NormalizedDocument) -> f64 {
        jaccard(doc1, doc2)
    }

    pub fn frequency_cosine(&self, doc1: &NormalizedDocument, doc2: &NormalizedDocument) -> f64 {
        frequency_cosine(doc1, doc2)
    }

    pub fn tfidf_cosine(
        &self,
        doc1: &NormalizedDocument,
        doc2: &NormalizedDocument,
    ) -> Result<f64, WeightedScoreError> {
        tfidf_cosine(doc1, doc2, self.config.max_features)
    }
}

/// `|A ∩ B| / |A ∪ B|` over the distinct words; 0 when both are empty.
pub fn jaccard(doc1: &NormalizedDocument, doc2: &NormalizedDocument) -> f64 {
    jaccard_sets(&doc1.token_set(), &doc2.token_set())
}

fn jaccard_sets(set1: &BTreeSet<&str>, set2: &BTreeSet<&str>) -> f64 {
    let union = set1.union(set2).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set1.intersection(set2).count();
    clamp_unit(intersection as f64 / union as f64)
}

/// Cosine of the raw word-count vectors; 0 when either vector is zero.
pub fn frequency_cosine(doc1: &NormalizedDocument, doc2: &NormalizedDocument) -> f64 {
    let counts1 = term_counts(doc1);
    let counts2 = term_counts(doc2);
    let vocabulary: BTreeSet<&str> = counts1.keys().chain(counts2.keys()).copied().collect();

    let weights = |counts: &BTreeMap<&str, usize>| -> Vec<f64> {
        vocabulary
            .iter()
            .map(|term| counts.get(term).copied().unwrap_or(0) as f64)
            .collect()
    };

    clamp_unit(cosine(&weights(&counts1), &weights(&counts2)).unwrap_or(0.0))
}

/// TF-IDF cosine over the pair, with smoothed IDF
/// `ln((1 + n) / (1 + df)) + 1` and `n = 2`.
///
/// Terms in both documents weigh 1 per occurrence; terms in one document
/// weigh `1 + ln(1.5)`. When `max_features` is set, only that many terms are
/// kept, most frequent first and ties broken lexicographically.
pub fn tfidf_cosine(
    doc1: &NormalizedDocument,
    doc2: &NormalizedDocument,
    max_features: Option<usize>,
) -> Result<f64, WeightedScoreError> {
    let counts1 = term_counts(doc1);
    let counts2 = term_counts(doc2);
    let vocabulary = select_vocabulary(&counts1, &counts2, max_features);

    if vocabulary.is_empty() {
        return Err(WeightedScoreError::EmptyVocabulary);
    }

    let idf = |term: &str| -> f64 {
        let df = usize::from(counts1.contains_key(term)) + usize::from(counts2.contains_key(term));
        ((1.0 + PAIR_DOCUMENTS) / (1.0 + df as f64)).ln() + 1.0
    };

    let weights = |counts: &BTreeMap<&str, usize>| -> Vec<f64> {
        vocabulary
            .iter()
            .map(|term| counts.get(term).copied().unwrap_or(0) as f64 * idf(term))
            .collect()
    };

    match cosine(&weights(&counts1), &weights(&counts2)) {
        Some(value) if value.is_finite() => Ok(clamp_unit(value)),
        Some(_) => Err(WeightedScoreError::NonFinite),
        None => Ok(0.0),
    }
}

fn term_counts(doc: &NormalizedDocument) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for word in doc.words() {
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}

/// Joint vocabulary in lexicographic order, trimmed to the `max_features`
/// most frequent terms.
fn select_vocabulary<'a>(
    counts1: &BTreeMap<&'a str, usize>,
    counts2: &BTreeMap<&'a str, usize>,
    max_features: Option<usize>,
) -> Vec<&'a str> {
    let mut totals: BTreeMap<&'a str, usize> = counts1.clone();
    for (term, count) in counts2 {
        *totals.entry(*term).or_insert(0) += count;
    }

    match max_features {
        Some(limit) if limit < totals.len() => {
            let mut ranked: Vec<(&'a str, usize)> = totals.into_iter().collect();
            // Stable sort keeps lexicographic order among equal counts.
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            let mut kept: Vec<&'a str> = ranked.into_iter().take(limit).map(|(t, _)| t).collect();
            kept.sort_unstable();
            kept
        }
        _ => totals.into_keys().collect(),
    }
}

/// `None` when either vector has zero norm.
fn cosine(v1: &[f64], v2: &[f64]) -> Option<f64> {
    let dot: f64 = v1.iter().zip(v2).map(|(a, b)| a * b).sum();
    let norm1_sq: f64 = v1.iter().map(|a| a * a).sum();
    let norm2_sq: f64 = v2.iter().map(|b| b * b).sum();
    if norm1_sq == 0.0 || norm2_sq == 0.0 {
        return None;
    }
    Some(dot / (norm1_sq * norm2_sq).sqrt())
}
