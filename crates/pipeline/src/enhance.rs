//! Prompt enhancement stage.
//!
//! The one stage that can never fail the job: any provider error,
//! malformed response, or empty completion is logged and the raw prompt
//! is used unchanged.

use std::sync::Arc;

use gifforge_providers::TextCompletionProvider;

/// Build the instructional request embedding the raw prompt.
fn enhancement_request(raw_prompt: &str) -> String {
    format!(
        "Rewrite the following description of a short animated scene into a \
         single vivid, detailed image-generation prompt. Reply with the \
         prompt only, no preamble.\n\nDescription: {raw_prompt}"
    )
}

/// Optional prompt-enhancement stage.
///
/// Constructed without a provider it is a pure pass-through, which is
/// also its behavior whenever the provider misbehaves.
pub struct PromptEnhancer {
    provider: Option<Arc<dyn TextCompletionProvider>>,
}

impl PromptEnhancer {
    pub fn new(provider: Arc<dyn TextCompletionProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// An enhancer with no provider configured: always pass-through.
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    /// Enhance the raw prompt, degrading to pass-through on any failure.
    pub async fn enhance(&self, raw_prompt: &str) -> String {
        let Some(provider) = &self.provider else {
            return raw_prompt.to_string();
        };

        match provider.complete(&enhancement_request(raw_prompt)).await {
            Ok(enhanced) => {
                tracing::debug!(
                    raw = raw_prompt,
                    enhanced = enhanced.as_str(),
                    "Prompt enhanced"
                );
                enhanced
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt enhancement failed; using raw prompt");
                raw_prompt.to_string()
            }
        }
    }
}
