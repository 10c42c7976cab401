//! Generated GIF artifact rows and DTOs.

use gifforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An immutable artifact record from the `generated_gifs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneratedGif {
    pub id: DbId,
    pub user_id: DbId,
    /// Final prompt text the still was synthesized from.
    pub prompt: String,
    pub overlay_text: Option<String>,
    pub gif_url: String,
    pub created_at: Timestamp,
}

/// Input for recording a newly generated GIF.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGeneratedGif {
    pub user_id: DbId,
    pub prompt: String,
    pub overlay_text: Option<String>,
    pub gif_url: String,
}
