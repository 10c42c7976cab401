//! The job orchestrator: sequences the stages, maps every failure to a
//! single stage-tagged outcome, and persists the artifact on success.

use std::sync::Arc;

use gifforge_core::prompt;
use gifforge_core::types::DbId;
use gifforge_db::models::generated_gif::{GeneratedGif, NewGeneratedGif};

use crate::animate::AnimationTaskController;
use crate::enhance::PromptEnhancer;
use crate::error::{GenerationError, Stage};
use crate::quota::SubscriptionStore;
use crate::record::Recorder;
use crate::synthesize::ImageSynthesizer;
use crate::transcode::MediaTranscoder;

/// Runs one GIF generation job per call, synchronously in the calling
/// task.
///
/// Stage order is strictly linear; a failing stage moves the job to its
/// terminal failure without refunding the quota reservation made at
/// admission.
pub struct GifGenerator {
    subscriptions: Arc<dyn SubscriptionStore>,
    enhancer: PromptEnhancer,
    synthesizer: ImageSynthesizer,
    animator: AnimationTaskController,
    transcoder: MediaTranscoder,
    recorder: Arc<dyn Recorder>,
}

impl GifGenerator {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        enhancer: PromptEnhancer,
        synthesizer: ImageSynthesizer,
        animator: AnimationTaskController,
        transcoder: MediaTranscoder,
        recorder: Arc<dyn Recorder>,
    ) -> Self {
        Self {
            subscriptions,
            enhancer,
            synthesizer,
            animator,
            transcoder,
            recorder,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// RESERVE short-circuits before any generation cost. ENHANCE cannot
    /// fail. Everything after is fatal on error, and the consumed quota
    /// slot stays consumed.
    pub async fn run(
        &self,
        user_id: DbId,
        raw_prompt: &str,
        overlay_text: Option<&str>,
    ) -> Result<GeneratedGif, GenerationError> {
        let overlay = prompt::sanitize_overlay(overlay_text);

        let reservation = self.subscriptions.reserve(user_id).await?;
        tracing::info!(
            user_id,
            used = reservation.used,
            limit = reservation.limit,
            "Quota slot reserved"
        );

        let enhanced = self.enhancer.enhance(raw_prompt).await;
        let final_prompt = prompt::build_final_prompt(&enhanced);

        tracing::info!(user_id, stage = %Stage::Synthesize, "Synthesizing base image");
        let jpeg = self
            .synthesizer
            .synthesize(&final_prompt, overlay.as_deref())
            .await?;

        tracing::info!(user_id, stage = %Stage::Animate, "Submitting for animation");
        let video_url = self.animator.animate(&jpeg).await?;

        tracing::info!(user_id, stage = %Stage::Transcode, video_url = video_url.as_str(), "Transcoding to GIF");
        let gif = self.transcoder.transcode(&video_url).await?;

        let record = NewGeneratedGif {
            user_id,
            prompt: final_prompt,
            overlay_text: overlay,
            gif_url: gif.url.clone(),
        };
        match self.recorder.save(&record).await {
            Ok(artifact) => {
                tracing::info!(user_id, artifact_id = artifact.id, gif_url = artifact.gif_url.as_str(), "GIF generation complete");
                Ok(artifact)
            }
            Err(source) => {
                // An artifact that was never recorded must not linger.
                let _ = tokio::fs::remove_file(&gif.path).await;
                Err(GenerationError::Database {
                    stage: Stage::Record,
                    source,
                })
            }
        }
    }
}
