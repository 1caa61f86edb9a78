use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::ingest::ExtractionError;
use crate::llm_client::{AllCandidatesFailed, LlmError};
use crate::render::RenderError;
use crate::scoring::ScoringError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("{0}")]
    ModelUnavailable(#[from] AllCandidatesFailed),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(
                "The uploaded file is larger than the upload limit.".to_string(),
            );
        }
        AppError::Validation(format!("Malformed multipart body: {err}"))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(anyhow::anyhow!("Blocking task failed: {err}"))
    }
}

impl AppError {
    /// Status, machine code and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
            ),
            AppError::Scoring(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "SCORING_ERROR",
                e.to_string(),
            ),
            AppError::ModelUnavailable(e) => {
                tracing::error!("No model candidate succeeded: {e}");
                (StatusCode::BAD_GATEWAY, "MODEL_UNAVAILABLE", e.to_string())
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The model stream failed before completing".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "The document could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }

    /// The `{"error": {...}}` body shared by JSON responses and SSE error events.
    pub fn body(code: &str, message: &str) -> Value {
        json!({
            "error": {
                "code": code,
                "message": message
            }
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, Json(AppError::body(code, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::CandidateFailure;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (
                AppError::PayloadTooLarge("x".into()),
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
            ),
            (
                AppError::Scoring(ScoringError::EmptyVocabulary),
                StatusCode::UNPROCESSABLE_ENTITY,
                "SCORING_ERROR",
            ),
            (
                AppError::Llm(LlmError::EmptyContent),
                StatusCode::BAD_GATEWAY,
                "LLM_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let (s, c, _) = err.parts();
            assert_eq!(s, status);
            assert_eq!(c, code);
        }
    }

    #[test]
    fn test_model_unavailable_lists_each_failure() {
        let err = AppError::from(AllCandidatesFailed {
            failures: vec![
                CandidateFailure {
                    model: "gemini-a".into(),
                    error: "quota".into(),
                },
                CandidateFailure {
                    model: "gemini-b".into(),
                    error: "timeout".into(),
                },
            ],
        });
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "MODEL_UNAVAILABLE");
        assert!(message.contains("gemini-a") && message.contains("quota"));
        assert!(message.contains("gemini-b") && message.contains("timeout"));
    }
}
