//! Subscription rows and quota projections.

use gifforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Subscription awaiting first payment confirmation.
pub const STATUS_PENDING: &str = "pending";
/// Subscription in good standing; the only status the quota gate admits.
pub const STATUS_ACTIVE: &str = "active";
/// Subscription lapsed (payment failure or cycle end).
pub const STATUS_INACTIVE: &str = "inactive";
/// Subscription cancelled by the user.
pub const STATUS_CANCELED: &str = "canceled";

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub plan_id: DbId,
    pub status: String,
    /// GIFs generated in the current billing cycle.
    pub gif_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Current-cycle usage joined with the plan limit, as read or returned
/// by the quota queries.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct QuotaUsage {
    pub subscription_id: DbId,
    pub gif_count: i32,
    pub gif_limit: i32,
}
