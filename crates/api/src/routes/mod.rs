pub mod gifs;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /gifs/generate    run one generation job (POST)
/// /gifs/history     list the principal's GIFs (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/gifs", gifs::router())
}
