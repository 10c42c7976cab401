//! Text-to-image client.
//!
//! Bearer-authenticated POST of `{"inputs": prompt}`; the success body
//! is the raw encoded image.

use async_trait::async_trait;

use crate::error::{ensure_success, ProviderError};
use crate::traits::ImageProvider;

/// Configuration for the text-to-image provider.
#[derive(Debug, Clone)]
pub struct ImageProviderConfig {
    /// Full model endpoint URL.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
}

/// HTTP client for the text-to-image provider.
pub struct ImageSynthesisClient {
    client: reqwest::Client,
    config: ImageProviderConfig,
}

impl ImageSynthesisClient {
    pub fn new(config: ImageProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: ImageProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ImageProvider for ImageSynthesisClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        let body = serde_json::json!({ "inputs": prompt });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        Ok(response.bytes().await?.to_vec())
    }
}
