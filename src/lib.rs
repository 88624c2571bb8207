//! Workspace umbrella crate for the plagiarism similarity service.
//!
//! This crate stitches together normalization, scoring and the blacklist so
//! callers can compare two submissions with a single API entry point:
//! [`PlagiarismAnalyzer`]. Build one at startup and share it by `Arc`.

pub mod config;

pub use blacklist::{
    BackendConfig, BlacklistEntry, BlacklistError, BlacklistStore, BLACKLIST_SCHEMA_VERSION,
};
pub use canonical::{
    clean_text, collapse_whitespace, normalize, tokenize, Alphabet, NormalizeConfig,
    NormalizeError, NormalizedDocument, Token, FRENCH_STOP_WORDS,
};
pub use matcher::{
    diff, to_percentage, Difference, EngineConfig, MatchError, SimilarityEngine, SimilarityResult,
    SCORE_WEIGHTS,
};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::PlagiatConfig;

/// Similarity percentage at or above which a submitter is blacklisted.
pub const DEFAULT_BLACKLIST_THRESHOLD: f64 = 80.0;

/// Reported in [`SimilarityReport::method_used`].
pub const METHOD_USED: &str = "TF-IDF + Jaccard + Cosine";

/// Reported instead of [`METHOD_USED`] when the TF-IDF measure fell back to
/// Jaccard.
pub const METHOD_USED_FALLBACK: &str = "Jaccard (TF-IDF fallback) + Jaccard + Cosine";

/// Errors that can occur while analyzing a pair of submissions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("normalization failure: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("blacklist failure: {0}")]
    Blacklist(#[from] BlacklistError),
    #[error("scoring failure: {0}")]
    Match(#[from] MatchError),
    #[error("configuration failure: {0}")]
    Config(String),
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_normalize(&self, latency: Duration, result: Result<(), NormalizeError>);
    fn record_score(&self, latency: Duration, weighted_fallback: bool);
    fn record_blacklist_write(&self, latency: Duration, result: Result<(), BlacklistError>);
}

/// Install or clear the global pipeline metrics recorder.
///
/// An analyzer built with [`PlagiarismAnalyzer::with_metrics`] reports to
/// its own recorder instead.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start(local: Option<&Arc<dyn PipelineMetrics>>) -> Option<Self> {
        local.cloned().or_else(metrics_recorder).map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_normalize(self, result: Result<(), NormalizeError>) {
        self.recorder.record_normalize(self.start.elapsed(), result);
    }

    fn record_score(self, weighted_fallback: bool) {
        self.recorder
            .record_score(self.start.elapsed(), weighted_fallback);
    }

    fn record_blacklist_write(self, result: Result<(), BlacklistError>) {
        self.recorder
            .record_blacklist_write(self.start.elapsed(), result);
    }
}

/// Per-measure breakdown. Scores are percentages rounded to two decimals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityDetails {
    pub jaccard_similarity: f64,
    pub cosine_basic: f64,
    pub tfidf_similarity: f64,
    pub final_weighted: f64,
    pub total_words_text1: usize,
    pub total_words_text2: usize,
    pub common_words_count: usize,
    #[serde(default)]
    pub weighted_fallback: bool,
}

impl From<&SimilarityResult> for SimilarityDetails {
    fn from(result: &SimilarityResult) -> Self {
        Self {
            jaccard_similarity: to_percentage(result.jaccard),
            cosine_basic: to_percentage(result.cosine_basic),
            tfidf_similarity: to_percentage(result.tfidf_cosine),
            final_weighted: to_percentage(result.final_score),
            total_words_text1: result.total_words_text1,
            total_words_text2: result.total_words_text2,
            common_words_count: result.common_words_count,
            weighted_fallback: result.weighted_fallback,
        }
    }
}

/// Result of [`PlagiarismAnalyzer::analyze_similarity`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityReport {
    /// Combined score in percent, rounded to two decimals.
    pub similarity_percentage: f64,
    pub method_used: String,
    pub details: SimilarityDetails,
    /// Set when the submitter was blacklisted by this comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default)]
    pub blacklisted: bool,
}

impl SimilarityReport {
    pub fn from_result(result: &SimilarityResult) -> Self {
        Self {
            similarity_percentage: result.final_percentage(),
            method_used: method_used(result).to_string(),
            details: SimilarityDetails::from(result),
            warning: None,
            blacklisted: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DifferenceDetails {
    pub common_count: usize,
    pub unique_text1_count: usize,
    pub unique_text2_count: usize,
    pub scores: SimilarityDetails,
}

/// Result of [`PlagiarismAnalyzer::analyze_with_differences`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DifferenceReport {
    pub similarity_percentage: f64,
    pub method_used: String,
    pub common_words: Vec<String>,
    pub unique_text1: Vec<String>,
    pub unique_text2: Vec<String>,
    pub details: DifferenceDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default)]
    pub blacklisted: bool,
}

impl DifferenceReport {
    /// The score part of this report, for threshold checks.
    pub fn similarity_report(&self) -> SimilarityReport {
        SimilarityReport {
            similarity_percentage: self.similarity_percentage,
            method_used: self.method_used.clone(),
            details: self.details.scores.clone(),
            warning: self.warning.clone(),
            blacklisted: self.blacklisted,
        }
    }
}

/// Output of the single-measure helpers ([`PlagiarismAnalyzer::jaccard_only`],
/// [`PlagiarismAnalyzer::cosine_only`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasureReport {
    pub method: String,
    pub similarity_percentage: f64,
    pub words_text1: usize,
    pub words_text2: usize,
    pub common_words: usize,
    pub total_unique_words: usize,
}

fn method_used(result: &SimilarityResult) -> &'static str {
    if result.weighted_fallback {
        METHOD_USED_FALLBACK
    } else {
        METHOD_USED
    }
}

/// Normalizes, scores and, when asked, blacklists.
///
/// Stateless apart from the blacklist store; safe to share across threads.
pub struct PlagiarismAnalyzer {
    normalize_cfg: NormalizeConfig,
    engine: SimilarityEngine,
    blacklist: BlacklistStore,
    threshold: f64,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl PlagiarismAnalyzer {
    pub fn new(
        normalize_cfg: NormalizeConfig,
        engine_cfg: EngineConfig,
        blacklist: BlacklistStore,
    ) -> Result<Self, PipelineError> {
        normalize_cfg.validate()?;
        let engine = SimilarityEngine::new(engine_cfg)?;
        Ok(Self {
            normalize_cfg,
            engine,
            blacklist,
            threshold: DEFAULT_BLACKLIST_THRESHOLD,
            metrics: None,
        })
    }

    /// Default configuration over an in-memory blacklist. Bans do not
    /// survive the process; durable setups go through [`Self::from_config`].
    pub fn in_memory() -> Self {
        Self {
            normalize_cfg: NormalizeConfig::default(),
            engine: SimilarityEngine::default(),
            blacklist: BlacklistStore::in_memory(),
            threshold: DEFAULT_BLACKLIST_THRESHOLD,
            metrics: None,
        }
    }

    /// Build every stage from a YAML pipeline config, opening the blacklist
    /// backend it names.
    pub fn from_config(cfg: &PlagiatConfig) -> Result<Self, PipelineError> {
        cfg.validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let backend = cfg
            .backend_config()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let store = BlacklistStore::new(&backend)?;
        let analyzer = Self::new(cfg.normalize_config(), cfg.engine_config(), store)?
            .with_threshold(cfg.blacklist.threshold);
        tracing::info!(
            name = cfg.name.as_deref().unwrap_or("unnamed"),
            threshold = analyzer.threshold,
            "analyzer configured"
        );
        Ok(analyzer)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Report to `recorder` instead of the global one.
    pub fn with_metrics(mut self, recorder: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(recorder);
        self
    }

    /// Configured blacklist threshold, in percent.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn normalize_config(&self) -> &NormalizeConfig {
        &self.normalize_cfg
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    pub fn blacklist(&self) -> &BlacklistStore {
        &self.blacklist
    }

    /// Normalize with the analyzer's configuration.
    pub fn normalize(&self, text: &str) -> Result<NormalizedDocument, PipelineError> {
        self.normalize_with(text, &self.normalize_cfg)
    }

    /// Normalize with an explicit configuration, reporting to metrics.
    pub fn normalize_with(
        &self,
        text: &str,
        cfg: &NormalizeConfig,
    ) -> Result<NormalizedDocument, PipelineError> {
        let span = MetricsSpan::start(self.metrics.as_ref());
        let result = normalize(text, cfg);
        if let Some(span) = span {
            span.record_normalize(result.as_ref().map(|_| ()).map_err(Clone::clone));
        }
        Ok(result?)
    }

    /// Normalize both texts. Fails before any scoring if either is empty.
    pub fn normalize_pair(
        &self,
        text1: &str,
        text2: &str,
    ) -> Result<(NormalizedDocument, NormalizedDocument), PipelineError> {
        let doc1 = self.normalize(text1)?;
        let doc2 = self.normalize(text2)?;
        Ok((doc1, doc2))
    }

    fn score(&self, doc1: &NormalizedDocument, doc2: &NormalizedDocument) -> SimilarityResult {
        let span = MetricsSpan::start(self.metrics.as_ref());
        let result = self.engine.score(doc1, doc2);
        if let Some(span) = span {
            span.record_score(result.weighted_fallback);
        }
        result
    }

    /// Compare two raw texts with all three measures.
    pub fn analyze_similarity(
        &self,
        text1: &str,
        text2: &str,
    ) -> Result<SimilarityReport, PipelineError> {
        let (doc1, doc2) = self.normalize_pair(text1, text2)?;
        let result = self.score(&doc1, &doc2);
        Ok(SimilarityReport::from_result(&result))
    }

    /// Compare two raw texts and list shared and specific words.
    pub fn analyze_with_differences(
        &self,
        text1: &str,
        text2: &str,
    ) -> Result<DifferenceReport, PipelineError> {
        let (doc1, doc2) = self.normalize_pair(text1, text2)?;
        let result = self.score(&doc1, &doc2);
        let difference = diff(&doc1, &doc2);
        let (common_count, unique_text1_count, unique_text2_count) = difference.counts();

        Ok(DifferenceReport {
            similarity_percentage: result.final_percentage(),
            method_used: method_used(&result).to_string(),
            common_words: difference.common,
            unique_text1: difference.unique1,
            unique_text2: difference.unique2,
            details: DifferenceDetails {
                common_count,
                unique_text1_count,
                unique_text2_count,
                scores: SimilarityDetails::from(&result),
            },
            warning: None,
            blacklisted: false,
        })
    }

    /// Word differences only, without scoring.
    pub fn differences(&self, text1: &str, text2: &str) -> Result<Difference, PipelineError> {
        let (doc1, doc2) = self.normalize_pair(text1, text2)?;
        Ok(diff(&doc1, &doc2))
    }

    pub fn jaccard_only(&self, text1: &str, text2: &str) -> Result<MeasureReport, PipelineError> {
        let (doc1, doc2) = self.normalize_pair(text1, text2)?;
        let score = self.engine.jaccard(&doc1, &doc2);
        Ok(measure_report("Jaccard Similarity", score, &doc1, &doc2))
    }

    pub fn cosine_only(&self, text1: &str, text2: &str) -> Result<MeasureReport, PipelineError> {
        let (doc1, doc2) = self.normalize_pair(text1, text2)?;
        let score = self.engine.frequency_cosine(&doc1, &doc2);
        Ok(measure_report("Cosine Similarity", score, &doc1, &doc2))
    }

    /// Whether `identifier` is blacklisted. Never writes.
    pub fn check_blacklist(&self, identifier: &str) -> Result<bool, PipelineError> {
        Ok(self.blacklist.is_blacklisted(identifier)?)
    }

    /// Blacklist `identifier` when the report's score reaches `threshold`
    /// (inclusive, in percent). The returned report carries a warning and
    /// `blacklisted = true` in that case; otherwise it is unchanged.
    pub fn record_if_over_threshold(
        &self,
        identifier: &str,
        mut report: SimilarityReport,
        threshold: f64,
    ) -> Result<SimilarityReport, PipelineError> {
        let similarity = report.similarity_percentage;
        if similarity < threshold || similarity.is_nan() {
            return Ok(report);
        }

        let reason = format!("Similarity {similarity}% >= threshold {threshold}%");
        let span = MetricsSpan::start(self.metrics.as_ref());
        let result = self.blacklist.record_offense(identifier, similarity, reason);
        if let Some(span) = span {
            span.record_blacklist_write(result.as_ref().map(|_| ()).map_err(Clone::clone));
        }
        let entry = result?;

        report.warning = Some(format!(
            "Similarity of {similarity}% reaches the {threshold}% threshold: \
             submitter {identifier} is now blacklisted (offense #{})",
            entry.offense_count
        ));
        report.blacklisted = true;
        Ok(report)
    }
}

fn measure_report(
    method: &str,
    score: f64,
    doc1: &NormalizedDocument,
    doc2: &NormalizedDocument,
) -> MeasureReport {
    let set1 = doc1.token_set();
    let set2 = doc2.token_set();
    MeasureReport {
        method: method.to_string(),
        similarity_percentage: to_percentage(score),
        words_text1: doc1.len(),
        words_text2: doc2.len(),
        common_words: set1.intersection(&set2).count(),
        total_unique_words: set1.union(&set2).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, RwLock};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingMetrics {
        events: RwLock<Vec<&'static str>>,
    }

    impl CountingMetrics {
        fn snapshot(&self) -> Vec<&'static str> {
            self.events.read().unwrap().clone()
        }
    }

    impl PipelineMetrics for CountingMetrics {
        fn record_normalize(&self, _latency: Duration, result: Result<(), NormalizeError>) {
            let label = if result.is_ok() {
                "normalize_ok"
            } else {
                "normalize_err"
            };
            self.events.write().unwrap().push(label);
        }

        fn record_score(&self, _latency: Duration, weighted_fallback: bool) {
            let label = if weighted_fallback {
                "score_fallback"
            } else {
                "score"
            };
            self.events.write().unwrap().push(label);
        }

        fn record_blacklist_write(&self, _latency: Duration, result: Result<(), BlacklistError>) {
            let label = if result.is_ok() {
                "blacklist_ok"
            } else {
                "blacklist_err"
            };
            self.events.write().unwrap().push(label);
        }
    }

    #[test]
    fn analyze_similarity_reports_percentages() {
        let analyzer = PlagiarismAnalyzer::in_memory();
        let report = analyzer
            .analyze_similarity("Le chat mange une souris", "Le chat mange une souris")
            .unwrap();
        assert_eq!(report.similarity_percentage, 100.0);
        assert_eq!(report.method_used, METHOD_USED);
        assert_eq!(report.details.jaccard_similarity, 100.0);
        assert_eq!(report.details.common_words_count, 5);
        assert!(report.warning.is_none());
        assert!(!report.blacklisted);
    }

    #[test]
    fn metrics_recorder_tracks_pipeline_outcome() {
        let metrics = Arc::new(CountingMetrics::default());
        let analyzer = PlagiarismAnalyzer::in_memory().with_metrics(metrics.clone());

        analyzer
            .analyze_similarity("texte original complet", "texte original")
            .unwrap();
        assert_eq!(
            metrics.snapshot(),
            vec!["normalize_ok", "normalize_ok", "score"]
        );
    }

    #[test]
    fn empty_input_never_reaches_engine() {
        let metrics = Arc::new(CountingMetrics::default());
        let analyzer = PlagiarismAnalyzer::in_memory().with_metrics(metrics.clone());

        let err = analyzer.analyze_similarity("", "un texte").unwrap_err();
        assert_eq!(err, PipelineError::Normalize(NormalizeError::EmptyInput));
        let events = metrics.snapshot();
        assert_eq!(events, vec!["normalize_err"]);
        assert!(!events.contains(&"score"));
    }

    #[test]
    fn threshold_is_inclusive() {
        let metrics = Arc::new(CountingMetrics::default());
        let analyzer = PlagiarismAnalyzer::in_memory().with_metrics(metrics.clone());
        let mut report = analyzer.analyze_similarity("a b", "c d").unwrap();
        report.similarity_percentage = 80.0;

        let out = analyzer
            .record_if_over_threshold("student-1", report, DEFAULT_BLACKLIST_THRESHOLD)
            .unwrap();
        assert!(out.blacklisted);
        assert!(out.warning.as_deref().unwrap().contains("80%"));
        assert!(analyzer.check_blacklist("student-1").unwrap());
        assert!(metrics.snapshot().contains(&"blacklist_ok"));
    }

    #[test]
    fn below_threshold_leaves_report_untouched() {
        let analyzer = PlagiarismAnalyzer::in_memory();
        let report = analyzer.analyze_similarity("chat noir", "chien blanc").unwrap();
        let out = analyzer
            .record_if_over_threshold("student-2", report.clone(), 80.0)
            .unwrap();
        assert_eq!(out, report);
        assert!(!analyzer.check_blacklist("student-2").unwrap());
        assert!(analyzer.blacklist().is_empty().unwrap());
    }

    #[test]
    fn invalid_normalize_config_rejected() {
        let cfg = NormalizeConfig {
            version: 0,
            ..Default::default()
        };
        let res = PlagiarismAnalyzer::new(cfg, EngineConfig::default(), BlacklistStore::in_memory());
        assert!(matches!(
            res,
            Err(PipelineError::Normalize(NormalizeError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn from_config_applies_threshold() {
        let yaml = "version: \"1.0\"\nblacklist:\n  backend: in_memory\n  threshold: 60\n";
        let cfg = PlagiatConfig::from_yaml(yaml).unwrap();
        let analyzer = PlagiarismAnalyzer::from_config(&cfg).unwrap();
        assert_eq!(analyzer.threshold(), 60.0);
    }

    #[test]
    fn single_measure_helpers() {
        let analyzer = PlagiarismAnalyzer::in_memory();
        let jaccard = analyzer.jaccard_only("le chat noir", "le chien noir").unwrap();
        assert_eq!(jaccard.similarity_percentage, 50.0);
        assert_eq!(jaccard.common_words, 2);
        assert_eq!(jaccard.total_unique_words, 4);

        let cosine = analyzer.cosine_only("a a", "a b").unwrap();
        assert_eq!(cosine.similarity_percentage, 70.71);
        assert_eq!(cosine.words_text1, 2);
    }
}
