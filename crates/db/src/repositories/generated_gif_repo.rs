//! Repository for the `generated_gifs` table (immutable artifact records).

use sqlx::PgPool;
use gifforge_core::types::DbId;

use crate::models::generated_gif::{GeneratedGif, NewGeneratedGif};

/// Column list for `generated_gifs` queries.
const COLUMNS: &str = "id, user_id, prompt, overlay_text, gif_url, created_at";

/// Maximum page size for history listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for history listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides insert and listing operations for generated GIFs.
pub struct GeneratedGifRepo;

impl GeneratedGifRepo {
    /// Insert a new artifact record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewGeneratedGif,
    ) -> Result<GeneratedGif, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_gifs (user_id, prompt, overlay_text, gif_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedGif>(&query)
            .bind(input.user_id)
            .bind(&input.prompt)
            .bind(&input.overlay_text)
            .bind(&input.gif_url)
            .fetch_one(pool)
            .await
    }

    /// List a user's GIFs, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<GeneratedGif>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM generated_gifs \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, GeneratedGif>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count all GIFs ever generated by a user.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM generated_gifs WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
