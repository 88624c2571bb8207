use super::*;

use canonical::{normalize, NormalizeConfig, Token};

use crate::types::to_percentage;

fn doc(text: &str) -> NormalizedDocument {
    normalize(text, &NormalizeConfig::default()).expect("normalize")
}

/// Builds a document directly, bypassing the empty-input check.
fn raw_doc(words: &[&str]) -> NormalizedDocument {
    let text = words.join(" ");
    NormalizedDocument {
        tokens: canonical::tokenize(&text),
        normalized_text: text,
        config: NormalizeConfig::default(),
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn identical_documents_score_one() {
    let a = doc("Le chat mange une souris");
    let engine = SimilarityEngine::default();
    let result = engine.score(&a, &a);

    assert_eq!(result.jaccard, 1.0);
    assert_eq!(result.cosine_basic, 1.0);
    assert_eq!(result.tfidf_cosine, 1.0);
    assert!(approx(result.final_score, 1.0));
    assert_eq!(result.final_percentage(), 100.0);
    assert!(!result.weighted_fallback);
    assert_eq!(result.total_words_text1, 5);
    assert_eq!(result.total_words_text2, 5);
    assert_eq!(result.common_words_count, 5);
}

#[test]
fn identical_with_repetitions_scores_one() {
    let a = doc("chat chat chien oiseau chat");
    assert_eq!(frequency_cosine(&a, &a), 1.0);
    assert_eq!(tfidf_cosine(&a, &a, None), Ok(1.0));
}

#[test]
fn disjoint_documents_score_zero() {
    let engine = SimilarityEngine::default();
    let result = engine.score(&doc("chat noir"), &doc("chien blanc"));

    assert_eq!(result.jaccard, 0.0);
    assert_eq!(result.cosine_basic, 0.0);
    assert_eq!(result.tfidf_cosine, 0.0);
    assert_eq!(result.final_percentage(), 0.0);
    assert_eq!(result.common_words_count, 0);
}

#[test]
fn jaccard_counts_distinct_words() {
    // {le, chat, noir} vs {le, chien, noir}: 2 shared out of 4.
    let a = doc("le chat noir le chat");
    let b = doc("le chien noir");
    assert!(approx(jaccard(&a, &b), 0.5));
}

#[test]
fn frequency_cosine_uses_counts() {
    // Vocabulary [a, b]: (2, 0) vs (1, 1) -> 2 / (2 * sqrt 2).
    let a = raw_doc(&["a", "a"]);
    let b = raw_doc(&["a", "b"]);
    assert!(approx(frequency_cosine(&a, &b), 1.0 / 2f64.sqrt()));
}

#[test]
fn tfidf_weights_unique_terms_higher() {
    // Shared "a" has idf 1, "b" and "c" have idf 1 + ln 1.5.
    let a = raw_doc(&["a", "b"]);
    let b = raw_doc(&["a", "c"]);
    let w = 1.0 + 1.5f64.ln();
    let expected = 1.0 / (1.0 + w * w);
    let score = tfidf_cosine(&a, &b, None).unwrap();
    assert!(approx(score, expected), "{score} vs {expected}");
    assert!(score < frequency_cosine(&a, &b));
}

#[test]
fn measures_are_symmetric() {
    let a = doc("la programmation en rust est sûre et rapide");
    let b = doc("rust est un langage de programmation rapide");
    let engine = SimilarityEngine::default();
    let ab = engine.score(&a, &b);
    let ba = engine.score(&b, &a);

    assert_eq!(ab.jaccard, ba.jaccard);
    assert!(approx(ab.cosine_basic, ba.cosine_basic));
    assert!(approx(ab.tfidf_cosine, ba.tfidf_cosine));
    assert!(approx(ab.final_score, ba.final_score));
}

#[test]
fn final_score_is_weighted_sum() {
    let a = doc("le soleil brille sur la mer calme");
    let b = doc("la mer est calme sous le soleil");
    let result = SimilarityEngine::default().score(&a, &b);

    let expected = 0.3 * result.jaccard + 0.2 * result.cosine_basic + 0.5 * result.tfidf_cosine;
    assert!(approx(result.final_score, expected));
    assert!((0.0..=1.0).contains(&result.final_score));
    let pct = result.final_percentage();
    assert!((0.0..=100.0).contains(&pct));
}

#[test]
fn empty_vocabulary_falls_back_to_jaccard() {
    let empty = raw_doc(&[]);
    assert_eq!(
        tfidf_cosine(&empty, &empty, None),
        Err(WeightedScoreError::EmptyVocabulary)
    );

    let result = SimilarityEngine::default().score(&empty, &empty);
    assert!(result.weighted_fallback);
    assert_eq!(result.tfidf_cosine, result.jaccard);
    assert_eq!(result.final_score, 0.0);
}

#[test]
fn zero_vector_scores_zero() {
    let empty = raw_doc(&[]);
    let a = raw_doc(&["mot"]);
    assert_eq!(frequency_cosine(&empty, &a), 0.0);
    assert_eq!(tfidf_cosine(&empty, &a, None), Ok(0.0));
}

#[test]
fn max_features_keeps_most_frequent_terms() {
    // Totals: a=3, b=2, c=1, d=1. With a cap of 2 only a and b survive,
    // so the c/d difference no longer matters.
    let a = raw_doc(&["a", "a", "b", "c"]);
    let b = raw_doc(&["a", "b", "d"]);
    let capped = tfidf_cosine(&a, &b, Some(2)).unwrap();
    let reference = tfidf_cosine(&raw_doc(&["a", "a", "b"]), &raw_doc(&["a", "b"]), None).unwrap();
    assert!(approx(capped, reference));
    assert!(capped > tfidf_cosine(&a, &b, None).unwrap());
}

#[test]
fn max_features_ties_break_lexicographically() {
    // Totals: z=3, a=1, b=1. A cap of 2 keeps z and then "a" over "b".
    let a = raw_doc(&["a", "z"]);
    let b = raw_doc(&["b", "z", "z"]);
    let w = 1.0 + 1.5f64.ln();
    let score = tfidf_cosine(&a, &b, Some(2)).unwrap();
    assert!(approx(score, 1.0 / (w * w + 1.0).sqrt()), "{score}");
}

#[test]
fn zero_max_features_rejected() {
    let err = SimilarityEngine::new(EngineConfig {
        max_features: Some(0),
    })
    .expect_err("config should be invalid");
    match err {
        MatchError::InvalidConfig(msg) => assert!(msg.contains("max_features")),
    }
}

#[test]
fn engine_config_defaults_from_json() {
    let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, EngineConfig::default());
    assert_eq!(cfg.max_features, Some(1000));
    let unlimited: EngineConfig = serde_json::from_str(r#"{"max_features":null}"#).unwrap();
    assert_eq!(unlimited.max_features, None);
}

#[test]
fn scores_are_reproducible() {
    let a = doc("Les étudiants rédigent un mémoire sur la biodiversité marine");
    let b = doc("Un mémoire sur la biodiversité est rédigé par les étudiants");
    let engine = SimilarityEngine::default();
    let first = engine.score(&a, &b);
    for _ in 0..10 {
        assert_eq!(engine.score(&a, &b), first);
    }
    assert_eq!(to_percentage(first.final_score), first.final_percentage());
}

#[test]
fn tokens_with_offsets_are_ignored_by_scoring() {
    // Scoring only looks at the words, never at byte offsets.
    let a = doc("mot autre");
    let mut b = a.clone();
    b.tokens = vec![
        Token {
            text: "mot".into(),
            start: 100,
            end: 103,
        },
        Token {
            text: "autre".into(),
            start: 0,
            end: 5,
        },
    ];
    assert_eq!(SimilarityEngine::default().score(&a, &b).final_score, 1.0);
}
