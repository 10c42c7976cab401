//! Subscription plan rows.

use gifforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub price_cents: i32,
    pub cycle: String,
    /// GIFs a subscriber may generate per billing cycle.
    pub gif_limit: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}
