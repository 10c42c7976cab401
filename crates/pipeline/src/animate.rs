//! Animation stage: data-URI submission and the bounded poll loop.
//!
//! This is the pipeline's single suspension point and dominates
//! end-to-end latency — provider animation times run from tens of
//! seconds to minutes. There is no cancellation: once submitted, the
//! remote task runs to completion on the provider side whatever happens
//! locally.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gifforge_providers::{TaskStatus, VideoProvider};

use crate::error::{GenerationError, Stage};

/// Bounds on the status poll loop.
///
/// The interval matches the provider's recommended cadence; the attempt
/// cap turns a hung task into a reportable failure instead of blocking
/// the caller forever.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Pause between status checks.
    pub interval: Duration,
    /// Maximum number of status checks before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// 120 checks, 5 seconds apart — roughly a ten-minute budget.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

/// Submits the still to the image-to-video provider and blocks until the
/// remote task reaches a terminal state (or the poll budget runs out).
pub struct AnimationTaskController {
    provider: Arc<dyn VideoProvider>,
    policy: PollPolicy,
}

impl AnimationTaskController {
    pub fn new(provider: Arc<dyn VideoProvider>, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    /// Animate the JPEG still. Returns the URL of the finished video.
    pub async fn animate(&self, jpeg: &[u8]) -> Result<String, GenerationError> {
        let data_uri = format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg));

        let task_id = self
            .provider
            .submit(&data_uri)
            .await
            .map_err(|e| GenerationError::from_provider(Stage::Animate, e))?;
        tracing::info!(task_id = task_id.as_str(), "Animation task submitted");

        for attempt in 1..=self.policy.max_attempts {
            match self
                .provider
                .task_status(&task_id)
                .await
                .map_err(|e| GenerationError::from_provider(Stage::Animate, e))?
            {
                TaskStatus::Succeeded { video_url } => {
                    tracing::info!(
                        task_id = task_id.as_str(),
                        video_url = video_url.as_str(),
                        attempt,
                        "Animation task succeeded"
                    );
                    return Ok(video_url);
                }
                TaskStatus::Failed { detail } => {
                    return Err(GenerationError::Provider {
                        stage: Stage::Animate,
                        status: None,
                        body: detail,
                    });
                }
                TaskStatus::Running => {
                    tracing::debug!(task_id = task_id.as_str(), attempt, "Animation task running");
                }
            }
            tokio::time::sleep(self.policy.interval).await;
        }

        Err(GenerationError::Protocol {
            stage: Stage::Animate,
            detail: format!(
                "task {task_id} not terminal after {} status checks",
                self.policy.max_attempts
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use gifforge_providers::ProviderError;

    use super::*;

    /// Replays a scripted sequence of task statuses.
    struct Scripted {
        statuses: Mutex<Vec<TaskStatus>>,
        submitted: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(statuses: Vec<TaskStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VideoProvider for Scripted {
        async fn submit(&self, image_data_uri: &str) -> Result<String, ProviderError> {
            self.submitted.lock().unwrap().push(image_data_uri.to_string());
            Ok("task-1".to_string())
        }

        async fn task_status(&self, _task_id: &str) -> Result<TaskStatus, ProviderError> {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.remove(0))
            } else {
                Ok(statuses[0].clone())
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            interval: Duration::ZERO,
            max_attempts,
        }
    }

    #[tokio::test]
    async fn polls_until_success_and_submits_a_jpeg_data_uri() {
        let provider = Arc::new(Scripted::new(vec![
            TaskStatus::Running,
            TaskStatus::Running,
            TaskStatus::Succeeded {
                video_url: "https://cdn/clip.mp4".to_string(),
            },
        ]));
        let controller = AnimationTaskController::new(provider.clone(), fast_policy(10));

        let url = controller.animate(b"jpeg bytes").await.unwrap();
        assert_eq!(url, "https://cdn/clip.mp4");

        let submitted = provider.submitted.lock().unwrap();
        assert!(submitted[0].starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn failed_task_is_fatal_with_the_status_payload() {
        let provider = Arc::new(Scripted::new(vec![TaskStatus::Failed {
            detail: r#"{"status":"FAILED","failure":"moderation"}"#.to_string(),
        }]));
        let controller = AnimationTaskController::new(provider, fast_policy(10));

        let err = controller.animate(b"jpeg bytes").await.unwrap_err();
        assert_matches!(
            err,
            GenerationError::Provider { stage: Stage::Animate, status: None, body }
                if body.contains("moderation")
        );
    }

    #[tokio::test]
    async fn poll_budget_exhaustion_is_a_protocol_error() {
        let provider = Arc::new(Scripted::new(vec![TaskStatus::Running]));
        let controller = AnimationTaskController::new(provider, fast_policy(3));

        let err = controller.animate(b"jpeg bytes").await.unwrap_err();
        assert_matches!(
            err,
            GenerationError::Protocol { stage: Stage::Animate, detail }
                if detail.contains("3 status checks")
        );
    }

    #[tokio::test]
    async fn submission_rejection_surfaces_the_provider_body() {
        struct RejectSubmit;

        #[async_trait]
        impl VideoProvider for RejectSubmit {
            async fn submit(&self, _uri: &str) -> Result<String, ProviderError> {
                Err(ProviderError::Api {
                    status: 400,
                    body: "invalid ratio".to_string(),
                })
            }
            async fn task_status(&self, _id: &str) -> Result<TaskStatus, ProviderError> {
                unreachable!("status must not be polled after a failed submit")
            }
        }

        let controller = AnimationTaskController::new(Arc::new(RejectSubmit), fast_policy(10));
        let err = controller.animate(b"jpeg bytes").await.unwrap_err();
        assert_matches!(
            err,
            GenerationError::Provider { stage: Stage::Animate, status: Some(400), body }
                if body == "invalid ratio"
        );
    }
}
