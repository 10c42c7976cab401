use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gifforge_core::error::CoreError;
use gifforge_pipeline::GenerationError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`GenerationError`] for
/// pipeline outcomes. Implements [`IntoResponse`] to produce consistent
/// JSON error responses with a stable `code` the frontend can branch on
/// (billing prompt vs. retry prompt).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `gifforge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A terminal pipeline failure.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Generation(generation) => classify_generation_error(generation),

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a pipeline failure into an HTTP status, code, and message.
///
/// Admission denials get 403 with distinct codes so callers can show a
/// billing prompt for one and an upgrade prompt for the other; provider
/// failures are 502 (retryable upstream trouble); local media failures
/// are 500.
fn classify_generation_error(err: &GenerationError) -> (StatusCode, &'static str, String) {
    match err {
        GenerationError::NoActiveSubscription => (
            StatusCode::FORBIDDEN,
            "NO_ACTIVE_SUBSCRIPTION",
            "No active subscription found".to_string(),
        ),
        GenerationError::QuotaExceeded { used, limit } => (
            StatusCode::FORBIDDEN,
            "QUOTA_EXCEEDED",
            format!("Monthly GIF generation limit reached ({used}/{limit})"),
        ),
        GenerationError::Provider { stage, status, .. } => {
            tracing::error!(stage = %stage, provider_status = ?status, error = %err, "Provider failure");
            (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_ERROR",
                format!("The {stage} provider rejected the request"),
            )
        }
        GenerationError::Protocol { stage, .. } => {
            tracing::error!(stage = %stage, error = %err, "Provider protocol failure");
            (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_PROTOCOL_ERROR",
                format!("The {stage} provider returned an unexpected response"),
            )
        }
        GenerationError::Decode(_)
        | GenerationError::Download { .. }
        | GenerationError::Transcode(_) => {
            tracing::error!(stage = %err.stage(), error = %err, "Generation failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                format!("GIF generation failed at the {} stage", err.stage()),
            )
        }
        GenerationError::Database { stage, source } => {
            tracing::error!(stage = %stage, error = %source, "Database error in pipeline");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
