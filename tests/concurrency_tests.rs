//! Concurrency and thread safety tests for the analyzer.

use std::sync::Arc;
use std::thread;

use plagiat::{BackendConfig, BlacklistStore, EngineConfig, NormalizeConfig, PlagiarismAnalyzer};

#[test]
fn concurrent_analysis_same_analyzer() {
    let analyzer = Arc::new(PlagiarismAnalyzer::in_memory());
    let text1 = "Concurrent analysis of the same pair of submissions";
    let text2 = "Concurrent analysis of another pair of submissions";

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || {
                analyzer
                    .analyze_similarity(text1, text2)
                    .expect("analysis should succeed")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let first = &results[0];
    for (i, result) in results.iter().enumerate().skip(1) {
        assert_eq!(first, result, "Thread {i} produced a different report");
    }
}

#[test]
fn concurrent_offenses_for_one_submitter_are_all_counted() {
    let analyzer = Arc::new(PlagiarismAnalyzer::in_memory());
    let report = analyzer.analyze_similarity("le chat", "le chat").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            let report = report.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    analyzer
                        .record_if_over_threshold("shared-submitter", report.clone(), 80.0)
                        .expect("record should succeed");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let entry = analyzer
        .blacklist()
        .get("shared-submitter")
        .unwrap()
        .expect("entry exists");
    assert_eq!(entry.offense_count, 80);
    assert_eq!(analyzer.blacklist().len().unwrap(), 1);
}

#[test]
fn concurrent_distinct_submitters_on_redb() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.redb");
    let store = BlacklistStore::new(&BackendConfig::redb(path.to_string_lossy())).unwrap();
    let analyzer = Arc::new(
        PlagiarismAnalyzer::new(NormalizeConfig::default(), EngineConfig::default(), store)
            .unwrap(),
    );

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || {
                let report = analyzer
                    .analyze_similarity("même texte copié", "même texte copié")
                    .unwrap();
                analyzer
                    .record_if_over_threshold(&format!("10.0.0.{i}"), report, 80.0)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().blacklisted);
    }

    let entries = analyzer.blacklist().list().unwrap();
    assert_eq!(entries.len(), 6);
    for i in 0..6 {
        assert!(analyzer.check_blacklist(&format!("10.0.0.{i}")).unwrap());
    }
}
