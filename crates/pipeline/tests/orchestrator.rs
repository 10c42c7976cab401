//! End-to-end pipeline scenarios over in-memory collaborators.
//!
//! These cover the orchestrator's admission, sequencing, cleanup, and
//! no-refund behavior without touching the network, a database, or the
//! ffmpeg binary.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use gifforge_core::ffmpeg::FfmpegError;
use gifforge_db::models::generated_gif::{GeneratedGif, NewGeneratedGif};
use gifforge_pipeline::{
    AnimationTaskController, GenerationError, GifEncoder, GifGenerator, ImageSynthesizer,
    MediaTranscoder, PollPolicy, PromptEnhancer, QuotaReservation, Recorder, Stage,
    SubscriptionStore,
};
use gifforge_providers::{ImageProvider, MediaFetcher, ProviderError, TaskStatus, VideoProvider};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// In-memory usage counter with the same admit-or-deny semantics as the
/// Postgres store.
struct FakeSubscriptionStore {
    active: bool,
    limit: i32,
    count: Mutex<i32>,
}

impl FakeSubscriptionStore {
    fn new(active: bool, limit: i32, count: i32) -> Self {
        Self {
            active,
            limit,
            count: Mutex::new(count),
        }
    }

    fn count(&self) -> i32 {
        *self.count.lock().unwrap()
    }
}

#[async_trait]
impl SubscriptionStore for FakeSubscriptionStore {
    async fn reserve(&self, _user_id: i64) -> Result<QuotaReservation, GenerationError> {
        if !self.active {
            return Err(GenerationError::NoActiveSubscription);
        }
        let mut count = self.count.lock().unwrap();
        if *count >= self.limit {
            return Err(GenerationError::QuotaExceeded {
                used: *count,
                limit: self.limit,
            });
        }
        *count += 1;
        Ok(QuotaReservation {
            used: *count,
            limit: self.limit,
        })
    }
}

/// Serves a fixed PNG and counts invocations.
struct CountingImageProvider {
    calls: AtomicU32,
    png: Vec<u8>,
}

impl CountingImageProvider {
    fn new() -> Self {
        let img = image::RgbaImage::from_pixel(64, 64, image::Rgba([200, 100, 50, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        Self {
            calls: AtomicU32::new(0),
            png,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for CountingImageProvider {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.png.clone())
    }
}

/// Replays a scripted status sequence, repeating the last entry.
struct ScriptedVideoProvider {
    calls: AtomicU32,
    statuses: Mutex<Vec<TaskStatus>>,
}

impl ScriptedVideoProvider {
    fn new(statuses: Vec<TaskStatus>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            statuses: Mutex::new(statuses),
        }
    }

    fn succeed_immediately() -> Self {
        Self::new(vec![TaskStatus::Succeeded {
            video_url: "https://cdn.example/clip.mp4".to_string(),
        }])
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProvider for ScriptedVideoProvider {
    async fn submit(&self, _image_data_uri: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
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

struct StaticFetcher;

#[async_trait]
impl MediaFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(b"fake mp4 bytes".to_vec())
    }
}

/// Stands in for ffmpeg by copying the input file.
struct CopyEncoder;

#[async_trait]
impl GifEncoder for CopyEncoder {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), FfmpegError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Fails after writing a partial output.
struct FailingEncoder;

#[async_trait]
impl GifEncoder for FailingEncoder {
    async fn encode(&self, _input: &Path, output: &Path) -> Result<(), FfmpegError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, b"partial").await?;
        Err(FfmpegError::ExecutionFailed {
            exit_code: Some(1),
            stderr: "moov atom not found".to_string(),
        })
    }
}

#[derive(Default)]
struct MemoryRecorder {
    saved: Mutex<Vec<NewGeneratedGif>>,
}

impl MemoryRecorder {
    fn records(&self) -> Vec<NewGeneratedGif> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl Recorder for MemoryRecorder {
    async fn save(&self, gif: &NewGeneratedGif) -> Result<GeneratedGif, sqlx::Error> {
        let mut saved = self.saved.lock().unwrap();
        saved.push(gif.clone());
        Ok(GeneratedGif {
            id: saved.len() as i64,
            user_id: gif.user_id,
            prompt: gif.prompt.clone(),
            overlay_text: gif.overlay_text.clone(),
            gif_url: gif.gif_url.clone(),
            created_at: chrono::Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    generator: GifGenerator,
    store: Arc<FakeSubscriptionStore>,
    image: Arc<CountingImageProvider>,
    video: Arc<ScriptedVideoProvider>,
    recorder: Arc<MemoryRecorder>,
    media_root: tempfile::TempDir,
}

fn build_harness(
    store: FakeSubscriptionStore,
    video: ScriptedVideoProvider,
    encoder: Arc<dyn GifEncoder>,
) -> Harness {
    let store = Arc::new(store);
    let image = Arc::new(CountingImageProvider::new());
    let video = Arc::new(video);
    let recorder = Arc::new(MemoryRecorder::default());
    let media_root = tempfile::tempdir().unwrap();

    let generator = GifGenerator::new(
        store.clone(),
        PromptEnhancer::disabled(),
        ImageSynthesizer::new(image.clone(), None),
        AnimationTaskController::new(
            video.clone(),
            PollPolicy {
                interval: Duration::ZERO,
                max_attempts: 10,
            },
        ),
        MediaTranscoder::new(
            Arc::new(StaticFetcher),
            encoder,
            media_root.path().to_path_buf(),
            "/media".to_string(),
        ),
        recorder.clone(),
    );

    Harness {
        generator,
        store,
        image,
        video,
        recorder,
        media_root,
    }
}

fn temp_files(root: &Path) -> usize {
    std::fs::read_dir(root.join("temp_videos"))
        .map(|d| d.count())
        .unwrap_or(0)
}

fn output_files(root: &Path) -> usize {
    std::fs::read_dir(root.join("ai_gifs"))
        .map(|d| d.count())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Scenario A: one slot left, everything succeeds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn last_slot_run_succeeds_and_records_one_artifact() {
    let h = build_harness(
        FakeSubscriptionStore::new(true, 30, 29),
        ScriptedVideoProvider::succeed_immediately(),
        Arc::new(CopyEncoder),
    );

    let artifact = h
        .generator
        .run(7, "sunset over mountains", None)
        .await
        .unwrap();

    assert_eq!(h.store.count(), 30);
    assert_eq!(
        artifact.prompt,
        "sunset over mountains, beautiful, high quality, cinematic"
    );
    assert_eq!(artifact.overlay_text, None);
    assert!(artifact.gif_url.starts_with("/media/ai_gifs/"));

    assert_eq!(h.recorder.records().len(), 1);
    assert_eq!(temp_files(h.media_root.path()), 0);
    assert_eq!(output_files(h.media_root.path()), 1);
}

// ---------------------------------------------------------------------------
// Scenario B: quota spent, nothing is called
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exhausted_quota_denies_before_any_provider_call() {
    let h = build_harness(
        FakeSubscriptionStore::new(true, 30, 30),
        ScriptedVideoProvider::succeed_immediately(),
        Arc::new(CopyEncoder),
    );

    let err = h
        .generator
        .run(7, "sunset over mountains", None)
        .await
        .unwrap_err();

    assert_matches!(err, GenerationError::QuotaExceeded { used: 30, limit: 30 });
    assert_eq!(err.stage(), Stage::Reserve);
    assert_eq!(h.store.count(), 30, "count unchanged on denial");
    assert_eq!(h.image.calls(), 0);
    assert_eq!(h.video.calls(), 0);
    assert!(h.recorder.records().is_empty());
}

#[tokio::test]
async fn missing_subscription_is_distinguishable_from_quota() {
    let h = build_harness(
        FakeSubscriptionStore::new(false, 30, 0),
        ScriptedVideoProvider::succeed_immediately(),
        Arc::new(CopyEncoder),
    );

    let err = h.generator.run(7, "a red fox", None).await.unwrap_err();
    assert_matches!(err, GenerationError::NoActiveSubscription);
    assert_eq!(h.image.calls(), 0);
}

// ---------------------------------------------------------------------------
// Scenario C: provider reports FAILED on the first poll
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_animation_ends_the_job_without_refunding_quota() {
    let h = build_harness(
        FakeSubscriptionStore::new(true, 30, 29),
        ScriptedVideoProvider::new(vec![TaskStatus::Failed {
            detail: r#"{"status":"FAILED","failureCode":"SAFETY"}"#.to_string(),
        }]),
        Arc::new(CopyEncoder),
    );

    let err = h
        .generator
        .run(7, "sunset over mountains", None)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Animate);
    assert!(h.recorder.records().is_empty(), "no artifact on failure");
    // Current behavior: the admitted attempt keeps its increment even
    // though the job failed downstream.
    assert_eq!(h.store.count(), 30, "no refund of the quota increment");
}

// ---------------------------------------------------------------------------
// Scenario D: transcode fails after the video download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transcode_failure_cleans_up_all_files() {
    let h = build_harness(
        FakeSubscriptionStore::new(true, 30, 0),
        ScriptedVideoProvider::succeed_immediately(),
        Arc::new(FailingEncoder),
    );

    let err = h.generator.run(7, "a red fox", None).await.unwrap_err();

    assert_eq!(err.stage(), Stage::Transcode);
    assert_matches!(err, GenerationError::Transcode(_));
    assert_eq!(temp_files(h.media_root.path()), 0, "temp download removed");
    assert_eq!(output_files(h.media_root.path()), 0, "no orphan output");
    assert!(h.recorder.records().is_empty());
    assert_eq!(h.store.count(), 1, "no refund of the quota increment");
}

// ---------------------------------------------------------------------------
// Overlay text flows sanitized into the record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overlay_text_is_sanitized_before_recording() {
    let h = build_harness(
        FakeSubscriptionStore::new(true, 30, 0),
        ScriptedVideoProvider::succeed_immediately(),
        Arc::new(CopyEncoder),
    );

    h.generator
        .run(7, "a red fox", Some("  \"Good morning!\"  "))
        .await
        .unwrap();

    let records = h.recorder.records();
    assert_eq!(records[0].overlay_text.as_deref(), Some("Good morning!"));
}

// ---------------------------------------------------------------------------
// Poll loop runs through transient states before succeeding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pipeline_survives_transient_poll_states() {
    let h = build_harness(
        FakeSubscriptionStore::new(true, 30, 0),
        ScriptedVideoProvider::new(vec![
            TaskStatus::Running,
            TaskStatus::Running,
            TaskStatus::Running,
            TaskStatus::Succeeded {
                video_url: "https://cdn.example/clip.mp4".to_string(),
            },
        ]),
        Arc::new(CopyEncoder),
    );

    let artifact = h.generator.run(7, "a red fox", None).await.unwrap();
    assert!(artifact.gif_url.ends_with(".gif"));
    assert_eq!(h.recorder.records().len(), 1);
}
