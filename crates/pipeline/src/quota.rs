//! Quota gate: the admission decision that consumes one usage slot
//! before a job may start.

use async_trait::async_trait;
use gifforge_core::types::DbId;
use gifforge_db::repositories::SubscriptionRepo;
use gifforge_db::DbPool;

use crate::error::{GenerationError, Stage};

/// A granted admission: the post-increment usage snapshot.
#[derive(Debug, Clone, Copy)]
pub struct QuotaReservation {
    pub used: i32,
    pub limit: i32,
}

/// Admission decisions against the per-principal usage counter.
///
/// Implementations must make the check and the increment one logical
/// operation: two concurrent requests must never both be admitted for a
/// single remaining slot.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn reserve(&self, user_id: DbId) -> Result<QuotaReservation, GenerationError>;
}

/// Postgres-backed store. The guarded single-statement UPDATE in
/// [`SubscriptionRepo::reserve_slot`] provides the required row-level
/// serialization.
pub struct PgSubscriptionStore {
    pool: DbPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn reserve(&self, user_id: DbId) -> Result<QuotaReservation, GenerationError> {
        let db_err = |source| GenerationError::Database {
            stage: Stage::Reserve,
            source,
        };

        if let Some(usage) = SubscriptionRepo::reserve_slot(&self.pool, user_id)
            .await
            .map_err(db_err)?
        {
            return Ok(QuotaReservation {
                used: usage.gif_count,
                limit: usage.gif_limit,
            });
        }

        // Nothing matched: either the quota is spent or there is no
        // active subscription at all. Callers surface different guidance
        // for the two, so look again to tell them apart.
        match SubscriptionRepo::usage(&self.pool, user_id)
            .await
            .map_err(db_err)?
        {
            Some(usage) => Err(GenerationError::QuotaExceeded {
                used: usage.gif_count,
                limit: usage.gif_limit,
            }),
            None => Err(GenerationError::NoActiveSubscription),
        }
    }
}
