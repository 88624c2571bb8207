use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plagiat::{BlacklistError, NormalizeError, PipelineError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Submitter {0} is blacklisted")]
    Blacklisted(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Blacklisted(_) => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Pipeline(err) => match err {
                PipelineError::Normalize(NormalizeError::EmptyInput) => StatusCode::BAD_REQUEST,
                PipelineError::Blacklist(BlacklistError::Unavailable(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                PipelineError::Blacklist(BlacklistError::InvalidIdentifier(_)) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Blacklisted(_) => "BLACKLISTED",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Pipeline(err) => match err {
                PipelineError::Normalize(NormalizeError::EmptyInput) => "EMPTY_INPUT",
                PipelineError::Normalize(_) | PipelineError::Match(_) | PipelineError::Config(_) => {
                    "CONFIG_ERROR"
                }
                PipelineError::Blacklist(BlacklistError::Unavailable(_)) => "STORE_UNAVAILABLE",
                PipelineError::Blacklist(BlacklistError::InvalidIdentifier(_)) => {
                    "INVALID_IDENTIFIER"
                }
                PipelineError::Blacklist(_) => "STORE_ERROR",
            },
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
            success: false,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BlacklistError> for ServerError {
    fn from(err: BlacklistError) -> Self {
        ServerError::Pipeline(PipelineError::Blacklist(err))
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("blocking task failed: {err}"))
    }
}

/// Malformed bodies, missing fields and wrong content types are all 400.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}
