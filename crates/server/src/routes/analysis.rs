use crate::error::{ServerError, ServerResult};
use crate::routes::{run_blocking, ApiJson};
use crate::state::ServerState;
use crate::submitter::{resolve_submitter, ClientIdentity};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use plagiat::{
    clean_text as clean, DifferenceReport, MeasureReport, NormalizeError, PipelineError,
    SimilarityReport,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Single-text request
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Word extraction request
#[derive(Debug, Deserialize)]
pub struct ExtractWordsRequest {
    pub text: String,

    /// Overrides the pipeline's stop-word setting for this request
    #[serde(default)]
    pub remove_stop_words: Option<bool>,
}

/// Two texts to compare
#[derive(Debug, Deserialize)]
pub struct TextPairRequest {
    pub text1: String,
    pub text2: String,
}

/// Comparison request; the submitter is blacklisted on high similarity
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub text1: String,
    pub text2: String,

    #[serde(default)]
    pub submitter_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitter_id: Option<String>,
    #[serde(flatten)]
    pub report: SimilarityReport,
}

#[derive(Debug, Serialize)]
pub struct CompareWithHighlightResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitter_id: Option<String>,
    #[serde(flatten)]
    pub report: DifferenceReport,
}

fn require_text(text: &str) -> ServerResult<()> {
    if text.trim().is_empty() {
        return Err(PipelineError::Normalize(NormalizeError::EmptyInput).into());
    }
    Ok(())
}

/// Clean a text: lowercase, letters only, collapsed whitespace
pub async fn clean_text(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<TextRequest>,
) -> ServerResult<impl IntoResponse> {
    require_text(&request.text)?;
    let cleaned = clean(&request.text, state.analyzer.normalize_config());

    Ok(Json(json!({
        "success": true,
        "original_text": request.text,
        "cleaned_text": cleaned,
    })))
}

/// Clean a text and split it into words
pub async fn extract_words(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<ExtractWordsRequest>,
) -> ServerResult<impl IntoResponse> {
    let mut cfg = state.analyzer.normalize_config().clone();
    if let Some(remove_stop_words) = request.remove_stop_words {
        cfg.remove_stop_words = remove_stop_words;
    }

    let doc = state.analyzer.normalize_with(&request.text, &cfg)?;
    let words: Vec<String> = doc.words().map(str::to_string).collect();

    Ok(Json(json!({
        "success": true,
        "original_text": request.text,
        "cleaned_text": doc.normalized_text,
        "word_count": words.len(),
        "words": words,
    })))
}

fn measure_json(report: MeasureReport) -> serde_json::Value {
    json!({
        "success": true,
        "method": report.method,
        "similarity_percentage": report.similarity_percentage,
        "details": {
            "words_text1": report.words_text1,
            "words_text2": report.words_text2,
            "common_words": report.common_words,
            "total_unique_words": report.total_unique_words,
        },
    })
}

/// Jaccard similarity only
pub async fn jaccard_similarity(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<TextPairRequest>,
) -> ServerResult<impl IntoResponse> {
    let report = state
        .analyzer
        .jaccard_only(&request.text1, &request.text2)?;
    Ok(Json(measure_json(report)))
}

/// Frequency cosine similarity only
pub async fn cosine_similarity(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<TextPairRequest>,
) -> ServerResult<impl IntoResponse> {
    let report = state
        .analyzer
        .cosine_only(&request.text1, &request.text2)?;
    Ok(Json(measure_json(report)))
}

/// Words present in both texts
pub async fn common_words(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<TextPairRequest>,
) -> ServerResult<impl IntoResponse> {
    let difference = state
        .analyzer
        .differences(&request.text1, &request.text2)?;

    Ok(Json(json!({
        "success": true,
        "common_count": difference.common.len(),
        "common_words": difference.common,
    })))
}

/// Words specific to each text
pub async fn unique_words(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<TextPairRequest>,
) -> ServerResult<impl IntoResponse> {
    let difference = state
        .analyzer
        .differences(&request.text1, &request.text2)?;

    Ok(Json(json!({
        "success": true,
        "unique_count_text1": difference.unique1.len(),
        "unique_count_text2": difference.unique2.len(),
        "unique_text1": difference.unique1,
        "unique_text2": difference.unique2,
    })))
}

/// Full comparison with all three measures
///
/// A blacklisted submitter is refused with 403. When the score reaches the
/// configured threshold the submitter is blacklisted and the response
/// carries a warning.
pub async fn compare(
    State(state): State<Arc<ServerState>>,
    client: ClientIdentity,
    ApiJson(request): ApiJson<CompareRequest>,
) -> ServerResult<Json<CompareResponse>> {
    let submitter = resolve_submitter(request.submitter_id.as_deref(), client);
    ensure_not_blacklisted(&state, submitter.as_deref()).await?;

    let report = state
        .analyzer
        .analyze_similarity(&request.text1, &request.text2)?;
    let report = apply_threshold(&state, submitter.clone(), report).await?;

    Ok(Json(CompareResponse {
        success: true,
        submitter_id: submitter,
        report,
    }))
}

/// Full comparison plus common and specific words
pub async fn compare_with_highlight(
    State(state): State<Arc<ServerState>>,
    client: ClientIdentity,
    ApiJson(request): ApiJson<CompareRequest>,
) -> ServerResult<Json<CompareWithHighlightResponse>> {
    let submitter = resolve_submitter(request.submitter_id.as_deref(), client);
    ensure_not_blacklisted(&state, submitter.as_deref()).await?;

    let mut report = state
        .analyzer
        .analyze_with_differences(&request.text1, &request.text2)?;
    let scored = apply_threshold(&state, submitter.clone(), report.similarity_report()).await?;
    report.warning = scored.warning;
    report.blacklisted = scored.blacklisted;

    Ok(Json(CompareWithHighlightResponse {
        success: true,
        submitter_id: submitter,
        report,
    }))
}

async fn ensure_not_blacklisted(state: &ServerState, submitter: Option<&str>) -> ServerResult<()> {
    let Some(id) = submitter.map(str::to_string) else {
        tracing::debug!("no submitter identifier, blacklist skipped");
        return Ok(());
    };

    let lookup = id.clone();
    let blacklisted =
        run_blocking(state, move |analyzer| analyzer.check_blacklist(&lookup)).await?;
    if blacklisted {
        tracing::info!(submitter = %id, "refusing blacklisted submitter");
        return Err(ServerError::Blacklisted(id));
    }
    Ok(())
}

async fn apply_threshold(
    state: &ServerState,
    submitter: Option<String>,
    report: SimilarityReport,
) -> ServerResult<SimilarityReport> {
    let threshold = state.analyzer.threshold();
    let Some(id) = submitter else {
        return Ok(report);
    };
    if report.similarity_percentage < threshold {
        return Ok(report);
    }

    let report = run_blocking(state, move |analyzer| {
        analyzer.record_if_over_threshold(&id, report, threshold)
    })
    .await?;

    if report.blacklisted {
        tracing::warn!(
            similarity = report.similarity_percentage,
            threshold,
            "submitter blacklisted"
        );
    }
    Ok(report)
}
