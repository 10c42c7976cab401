//! Collaborator seams for the outbound provider interfaces.
//!
//! The pipeline depends on these traits rather than the concrete reqwest
//! clients, so integration tests run against in-memory fakes.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Normalized state of a remote animation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Queued, throttled, or running: keep polling.
    Running,
    /// Terminal success with the resolved output location.
    Succeeded { video_url: String },
    /// Terminal failure; `detail` is the provider's status payload.
    Failed { detail: String },
}

/// Generative text completion (prompt enhancement).
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    /// Return a single completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Text-to-image synthesis.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Return raw encoded image bytes for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Image-to-video animation: submission plus status polling.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Submit an image (as a data URI) and return the provider task id.
    async fn submit(&self, image_data_uri: &str) -> Result<String, ProviderError>;

    /// Fetch the current status of a submitted task.
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ProviderError>;
}

/// Plain HTTP fetch of finished media bytes.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}
