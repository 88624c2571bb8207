//! # Plagiat Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` scores how similar two normalized submissions are and reports
//! which words they share. It sits directly on top of `canonical`: every
//! function here takes [`canonical::NormalizedDocument`] values and never
//! touches raw text.
//!
//! ## Measures
//!
//! - **Jaccard**: overlap of the distinct word sets.
//! - **Frequency cosine**: cosine of raw word-count vectors.
//! - **TF-IDF cosine**: cosine of count × smoothed-IDF vectors over the pair.
//!   If it fails the engine falls back to the Jaccard score and logs a
//!   warning.
//!
//! The combined score is `0.3 * jaccard + 0.2 * cosine + 0.5 * tfidf`
//! ([`SCORE_WEIGHTS`]). Every score lies in [0, 1]; [`to_percentage`]
//! converts to the two-decimal percentages shown to users.
//!
//! ## Determinism
//!
//! Vocabularies and counts live in ordered maps and sums run in
//! lexicographic term order, so a given pair always yields bit-identical
//! scores.
//!
//! ## Example Usage
//!
//! ```rust
//! use canonical::{normalize, NormalizeConfig};
//! use matcher::{diff, SimilarityEngine};
//!
//! let cfg = NormalizeConfig::default();
//! let a = normalize("Le chat mange une souris", &cfg).unwrap();
//! let b = normalize("Le chat mange une souris", &cfg).unwrap();
//!
//! let engine = SimilarityEngine::default();
//! let result = engine.score(&a, &b);
//! assert_eq!(result.final_percentage(), 100.0);
//! assert_eq!(diff(&a, &b).counts(), (5, 0, 0));
//! ```

pub mod diff;
pub mod engine;
pub mod types;

pub use crate::diff::{diff, Difference};
pub use crate::engine::{frequency_cosine, jaccard, tfidf_cosine, EngineConfig, SimilarityEngine};
pub use crate::types::{
    to_percentage, MatchError, ScoreWeights, SimilarityResult, WeightedScoreError, SCORE_WEIGHTS,
};
