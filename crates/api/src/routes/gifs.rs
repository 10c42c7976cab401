use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount the GIF generation and history routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::gifs::generate))
        .route("/history", get(handlers::gifs::history))
}
