//! Repository for the `subscriptions` table.

use sqlx::PgPool;
use gifforge_core::types::DbId;

use crate::models::subscription::{QuotaUsage, Subscription, STATUS_ACTIVE};

/// Column list for `subscriptions` queries.
const COLUMNS: &str = "id, user_id, plan_id, status, gif_count, created_at, updated_at";

/// Provides quota and lookup operations for subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Atomically consume one quota slot for the user's active subscription.
    ///
    /// Check and increment happen in a single guarded UPDATE so two
    /// concurrent requests can never both be admitted for the last slot:
    /// the row lock taken by the first UPDATE makes the second re-evaluate
    /// `gif_count < gif_limit` against the incremented value.
    ///
    /// Returns the post-increment usage, or `None` when no active
    /// subscription with remaining quota matched (use [`usage`](Self::usage)
    /// to distinguish "no subscription" from "limit reached").
    pub async fn reserve_slot(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<QuotaUsage>, sqlx::Error> {
        sqlx::query_as::<_, QuotaUsage>(
            "UPDATE subscriptions s \
             SET gif_count = s.gif_count + 1, updated_at = NOW() \
             FROM plans p \
             WHERE p.id = s.plan_id \
               AND s.user_id = $1 \
               AND s.status = $2 \
               AND s.gif_count < p.gif_limit \
             RETURNING s.id AS subscription_id, s.gif_count, p.gif_limit",
        )
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(pool)
        .await
    }

    /// Read the current usage for the user's active subscription.
    pub async fn usage(pool: &PgPool, user_id: DbId) -> Result<Option<QuotaUsage>, sqlx::Error> {
        sqlx::query_as::<_, QuotaUsage>(
            "SELECT s.id AS subscription_id, s.gif_count, p.gif_limit \
             FROM subscriptions s \
             JOIN plans p ON p.id = s.plan_id \
             WHERE s.user_id = $1 AND s.status = $2",
        )
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(pool)
        .await
    }

    /// Find the user's subscription row regardless of status.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Reset the cycle counter for one subscription (billing rollover).
    /// Returns `true` if a row was updated.
    pub async fn reset_cycle_count(
        pool: &PgPool,
        subscription_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions SET gif_count = 0, updated_at = NOW() WHERE id = $1",
        )
        .bind(subscription_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
