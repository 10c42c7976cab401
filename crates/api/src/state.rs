use std::sync::Arc;

use gifforge_pipeline::GifGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gifforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The GIF generation pipeline.
    pub generator: Arc<GifGenerator>,
}
