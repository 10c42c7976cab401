//! Text-completion client for prompt enhancement.
//!
//! Speaks the Hugging Face inference protocol: bearer-authenticated POST
//! with an `inputs` payload, answered by a list of generated texts.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ensure_success, ProviderError};
use crate::traits::TextCompletionProvider;

/// Configuration for the text-completion provider.
#[derive(Debug, Clone)]
pub struct EnhanceConfig {
    /// Full model endpoint URL.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
}

/// HTTP client for the text-completion provider.
pub struct TextCompletionClient {
    client: reqwest::Client,
    config: EnhanceConfig,
}

/// One completion from the inference response.
#[derive(Debug, Deserialize)]
struct Completion {
    generated_text: String,
}

impl TextCompletionClient {
    pub fn new(config: EnhanceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: EnhanceConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TextCompletionProvider for TextCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": 96,
                "return_full_text": false,
            },
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let completions: Vec<Completion> = response.json().await?;
        let text = completions
            .into_iter()
            .next()
            .map(|c| c.generated_text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Protocol("empty completion".to_string()))?;

        Ok(text)
    }
}
