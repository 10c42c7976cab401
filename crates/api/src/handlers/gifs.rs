//! Handlers for GIF generation and history.
//!
//! Routes:
//! - `POST /gifs/generate` — run one generation job synchronously
//! - `GET  /gifs/history`  — list the principal's generated GIFs
//!
//! `user_id` is the opaque principal reference; authentication is
//! handled upstream of this service.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gifforge_core::prompt;
use gifforge_core::types::DbId;
use gifforge_db::repositories::GeneratedGifRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /gifs/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateGifRequest {
    /// Opaque principal reference.
    pub user_id: DbId,
    /// Scene description to generate from.
    pub prompt: String,
    /// Optional caption composited onto the animation.
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /api/v1/gifs/generate
///
/// Validates the prompt, then runs the full pipeline in this request's
/// task. Blocks until the remote animation finishes, so expect
/// minute-scale latency on success.
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateGifRequest>,
) -> AppResult<impl IntoResponse> {
    prompt::validate_prompt(&input.prompt).map_err(AppError::Core)?;

    let artifact = state
        .generator
        .run(input.user_id, &input.prompt, input.text.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: artifact })))
}

/// Query of `GET /gifs/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Opaque principal reference.
    pub user_id: DbId,
    /// Page size; capped server-side.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /api/v1/gifs/history
///
/// Returns the principal's generated GIFs, newest first.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<impl IntoResponse> {
    let gifs = GeneratedGifRepo::list_by_user(&state.pool, query.user_id, query.limit).await?;
    Ok(Json(DataResponse { data: gifs }))
}
