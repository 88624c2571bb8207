//! Prometheus wiring for the pipeline metrics hook and HTTP traffic.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use plagiat::{BlacklistError, NormalizeError, PipelineMetrics};

static PROMETHEUS: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the process-wide Prometheus recorder on first use and return its
/// render handle. `None` if another recorder was installed first.
pub fn prometheus_handle() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "prometheus recorder not installed");
                None
            }
        })
        .clone()
}

/// Reports pipeline stages through the `metrics` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusPipelineMetrics;

fn outcome<E>(result: &Result<(), E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

impl PipelineMetrics for PrometheusPipelineMetrics {
    fn record_normalize(&self, latency: Duration, result: Result<(), NormalizeError>) {
        counter!("plagiat_normalize_total", "outcome" => outcome(&result)).increment(1);
        histogram!("plagiat_normalize_seconds").record(latency.as_secs_f64());
    }

    fn record_score(&self, latency: Duration, weighted_fallback: bool) {
        let method = if weighted_fallback { "fallback" } else { "tfidf" };
        counter!("plagiat_score_total", "method" => method).increment(1);
        histogram!("plagiat_score_seconds").record(latency.as_secs_f64());
    }

    fn record_blacklist_write(&self, latency: Duration, result: Result<(), BlacklistError>) {
        counter!("plagiat_blacklist_writes_total", "outcome" => outcome(&result)).increment(1);
        histogram!("plagiat_blacklist_write_seconds").record(latency.as_secs_f64());
    }
}

/// Count one HTTP request and its latency.
pub fn record_http_request(method: &str, status: u16, latency: Duration) {
    counter!(
        "plagiat_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("plagiat_http_request_seconds").record(latency.as_secs_f64());
}
