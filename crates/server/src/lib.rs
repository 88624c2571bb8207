//! Plagiat Server - HTTP REST API for the plagiarism similarity service
//!
//! Exposes the [`plagiat::PlagiarismAnalyzer`] over JSON:
//!
//! - **Text tools**: cleaning and word extraction
//! - **Similarity**: Jaccard, cosine, and the combined TF-IDF score
//! - **Differences**: common and specific words of two texts
//! - **Blacklist**: submitters whose texts reached the similarity threshold
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health`, `GET /api/health` - Liveness probe
//! - `GET /ready` - Readiness probe (checks the blacklist store)
//! - `GET /metrics` - Prometheus metrics
//! - `POST /api/clean-text` - Clean a text
//! - `POST /api/extract-words` - Extract words, optionally without stop words
//! - `POST /api/jaccard-similarity` - Jaccard similarity
//! - `POST /api/cosine-similarity` - Frequency cosine similarity
//! - `POST /api/common-words` - Words shared by two texts
//! - `POST /api/unique-words` - Words specific to each text
//! - `POST /api/compare` - Combined score; blacklists on high similarity
//! - `POST /api/compare-with-highlight` - Combined score plus word differences
//! - `GET /api/blacklist` - List blacklisted submitters
//! - `GET /api/blacklist/{id}` - One blacklisted submitter
//! - `DELETE /api/blacklist/{id}` - Remove a submitter from the blacklist
//!
//! Errors are returned as `{"error": {"code", "message"}, "success": false}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod submitter;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
