//! Image-to-video client (Runway-style task API).
//!
//! Submission returns a task id; the task is then polled until terminal.
//! The provider's `output` field is returned either as a bare URL or as
//! a list of URLs depending on model version, so decoding normalizes
//! both shapes into one canonical value.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ensure_success, ProviderError};
use crate::traits::{TaskStatus, VideoProvider};

/// Configuration for the image-to-video provider.
#[derive(Debug, Clone)]
pub struct VideoProviderConfig {
    /// API base URL, e.g. `https://api.dev.runwayml.com/v1`.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Value of the provider's API version header.
    pub api_version: String,
    /// Model variant to animate with.
    pub model: String,
    /// Clip duration in seconds.
    pub duration_secs: u32,
    /// Output aspect ratio, e.g. `960:960`.
    pub ratio: String,
}

impl VideoProviderConfig {
    /// Fixed generation parameters used when only credentials are known.
    pub fn with_defaults(api_url: String, api_key: String) -> Self {
        Self {
            api_url,
            api_key,
            api_version: "2024-11-06".to_string(),
            model: "gen4_turbo".to_string(),
            duration_secs: 3,
            ratio: "960:960".to_string(),
        }
    }
}

/// HTTP client for the image-to-video provider.
pub struct AnimationClient {
    client: reqwest::Client,
    config: VideoProviderConfig,
}

/// Name of the provider's API version header.
const VERSION_HEADER: &str = "X-Runway-Version";

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

/// Task status response body.
#[derive(Debug, Deserialize)]
struct TaskStatusResponse {
    status: String,
    #[serde(default)]
    output: Option<OutputField>,
}

/// The `output` field arrives as either a bare URL or a list of URLs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OutputField {
    Many(Vec<String>),
    One(String),
}

impl OutputField {
    /// Canonical single URL: the value itself, or the first list element.
    fn into_url(self) -> Option<String> {
        match self {
            OutputField::One(url) => Some(url),
            OutputField::Many(urls) => urls.into_iter().next(),
        }
    }
}

/// Extract the task id from a submission response body.
fn extract_task_id(body: &str) -> Result<String, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::Protocol(format!("unparseable submit response: {e}")))?;
    value
        .get("id")
        .and_then(|id| id.as_str())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::Protocol("submit response has no task id".to_string()))
}

/// Normalize a task status body into a [`TaskStatus`].
///
/// `SUCCEEDED` without a usable output URL is a protocol error; a failed
/// task carries the whole status payload so callers can surface it.
fn normalize_status(body: &str) -> Result<TaskStatus, ProviderError> {
    let parsed: TaskStatusResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Protocol(format!("unparseable task status: {e}")))?;

    match parsed.status.as_str() {
        "SUCCEEDED" => {
            let video_url = parsed
                .output
                .and_then(OutputField::into_url)
                .ok_or_else(|| {
                    ProviderError::Protocol("succeeded task has no output URL".to_string())
                })?;
            Ok(TaskStatus::Succeeded { video_url })
        }
        "FAILED" => Ok(TaskStatus::Failed {
            detail: body.to_string(),
        }),
        _ => Ok(TaskStatus::Running),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl AnimationClient {
    pub fn new(config: VideoProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: VideoProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl VideoProvider for AnimationClient {
    async fn submit(&self, image_data_uri: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "promptImage": image_data_uri,
            "model": self.config.model,
            "duration": self.config.duration_secs,
            "ratio": self.config.ratio,
        });

        let response = self
            .client
            .post(format!("{}/image_to_video", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .header(VERSION_HEADER, &self.config.api_version)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let task_id = extract_task_id(&response.text().await?)?;
        tracing::debug!(task_id = task_id.as_str(), "Animation task created");
        Ok(task_id)
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ProviderError> {
        let response = self
            .client
            .get(format!("{}/tasks/{}", self.config.api_url, task_id))
            .bearer_auth(&self.config.api_key)
            .header(VERSION_HEADER, &self.config.api_version)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        normalize_status(&response.text().await?)
    }
}
