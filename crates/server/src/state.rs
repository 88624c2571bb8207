use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::telemetry::{prometheus_handle, PrometheusPipelineMetrics};
use metrics_exporter_prometheus::PrometheusHandle;
use plagiat::config::PlagiatConfig;
use plagiat::{set_pipeline_metrics, PlagiarismAnalyzer};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Analyzer instance (shared across requests)
    pub analyzer: Arc<PlagiarismAnalyzer>,

    /// Prometheus render handle, when metrics are enabled
    pub prometheus: Option<PrometheusHandle>,

    started_at: Instant,
}

impl ServerState {
    /// Create new server state, building the analyzer from the configured
    /// pipeline YAML, or from library defaults over a redb blacklist at
    /// `blacklist_path`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = match config.pipeline_config.as_deref() {
            Some(path) => PlagiatConfig::from_file(path)
                .map_err(|e| ServerError::Config(format!("{path}: {e}")))?,
            None => {
                tracing::info!(
                    path = %config.blacklist_path,
                    "no pipeline config, using defaults with a redb blacklist"
                );
                let mut pipeline = PlagiatConfig::default();
                pipeline.blacklist.path = Some(config.blacklist_path.clone());
                pipeline
            }
        };
        let analyzer = PlagiarismAnalyzer::from_config(&pipeline)?;

        Ok(Self::with_analyzer(config, analyzer))
    }

    /// Wrap an already built analyzer, e.g. an in-memory one in tests.
    pub fn with_analyzer(config: ServerConfig, analyzer: PlagiarismAnalyzer) -> Self {
        let prometheus = if config.metrics_enabled {
            let handle = prometheus_handle();
            if handle.is_some() {
                set_pipeline_metrics(Some(Arc::new(PrometheusPipelineMetrics)));
            }
            handle
        } else {
            None
        };

        Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
            prometheus,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
