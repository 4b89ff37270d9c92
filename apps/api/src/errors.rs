use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Extraction(String),

    #[error("{message}")]
    Schema {
        message: String,
        details: Vec<String>,
    },

    #[error("Upstream LLM unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wraps an LLM failure, keeping schema and availability failures distinct.
    /// `stage` names what was being attempted and prefixes the message.
    pub fn from_llm(stage: &str, err: LlmError) -> Self {
        match err {
            LlmError::Schema { details } => AppError::Schema {
                message: format!("Data validation error from LLM output during {stage}"),
                details,
            },
            e @ (LlmError::Unavailable { .. } | LlmError::CircuitOpen { .. }) => {
                AppError::UpstreamUnavailable(format!("{stage}: {e}"))
            }
            e => AppError::Llm(format!("{stage} failed: {e}")),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Schema { .. } => "SCHEMA_VALIDATION_ERROR",
            AppError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Extraction(_)
            | AppError::Schema { .. }
            | AppError::Llm(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured validation details, if any.
    pub fn details(&self) -> Option<&[String]> {
        match self {
            AppError::Schema { details, .. } => Some(details),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Validation(_) => {}
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            other => tracing::error!("{}: {other}", other.code()),
        }

        let mut error = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
