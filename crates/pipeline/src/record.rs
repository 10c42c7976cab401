//! Recorder seam: durable persistence of the finished artifact.

use async_trait::async_trait;
use gifforge_db::models::generated_gif::{GeneratedGif, NewGeneratedGif};
use gifforge_db::repositories::GeneratedGifRepo;
use gifforge_db::DbPool;

/// Persists one [`GeneratedGif`] record per successful job.
#[async_trait]
pub trait Recorder: Send + Sync {
    async fn save(&self, gif: &NewGeneratedGif) -> Result<GeneratedGif, sqlx::Error>;
}

/// Postgres-backed recorder.
pub struct PgRecorder {
    pool: DbPool,
}

impl PgRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Recorder for PgRecorder {
    async fn save(&self, gif: &NewGeneratedGif) -> Result<GeneratedGif, sqlx::Error> {
        GeneratedGifRepo::create(&self.pool, gif).await
    }
}
