//! Transcode stage: download the finished video, convert it to a
//! compressed looping GIF, and clean up the temporary download on every
//! exit path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use gifforge_core::ffmpeg::{self, FfmpegError};
use gifforge_core::temp::TempMedia;
use gifforge_providers::MediaFetcher;

use crate::error::GenerationError;

/// Subdirectory for downloaded provider videos awaiting transcode.
pub const TEMP_SUBDIR: &str = "temp_videos";

/// Subdirectory for finished GIF artifacts.
pub const OUTPUT_SUBDIR: &str = "ai_gifs";

/// Encodes a downloaded video file into a looping GIF.
///
/// A seam rather than a direct call so orchestrator tests don't need the
/// ffmpeg binary.
#[async_trait]
pub trait GifEncoder: Send + Sync {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), FfmpegError>;
}

/// Production encoder: shells out to ffmpeg.
///
/// The joint width cap + frame-rate drop is the compression strategy:
/// it trades fidelity for file size.
#[derive(Debug, Clone, Copy)]
pub struct FfmpegGifEncoder {
    /// Output width cap in pixels; aspect ratio is preserved.
    pub max_width: u32,
    /// Output frame rate.
    pub fps: u32,
}

impl Default for FfmpegGifEncoder {
    fn default() -> Self {
        Self {
            max_width: 480,
            fps: 12,
        }
    }
}

#[async_trait]
impl GifEncoder for FfmpegGifEncoder {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), FfmpegError> {
        ffmpeg::transcode_to_gif(input, output, self.max_width, self.fps).await
    }
}

/// A finished GIF: where it landed on disk and the URL to record.
#[derive(Debug, Clone)]
pub struct TranscodedGif {
    pub path: PathBuf,
    pub url: String,
}

/// Downloads the provider's video and transcodes it to a GIF under
/// `<media_root>/ai_gifs/`.
pub struct MediaTranscoder {
    fetcher: Arc<dyn MediaFetcher>,
    encoder: Arc<dyn GifEncoder>,
    media_root: PathBuf,
    public_base: String,
}

impl MediaTranscoder {
    /// `public_base` is the URL prefix the media root is served under,
    /// e.g. `/media`.
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        encoder: Arc<dyn GifEncoder>,
        media_root: PathBuf,
        public_base: String,
    ) -> Self {
        Self {
            fetcher,
            encoder,
            media_root,
            public_base,
        }
    }

    /// Download `video_url` and produce the looping GIF artifact.
    ///
    /// The temporary download is removed before returning on every path;
    /// a partially written output is removed on encode failure so it can
    /// never be recorded.
    pub async fn transcode(&self, video_url: &str) -> Result<TranscodedGif, GenerationError> {
        let bytes = self
            .fetcher
            .fetch(video_url)
            .await
            .map_err(GenerationError::from_download)?;
        tracing::debug!(video_url, size = bytes.len(), "Downloaded provider video");

        let temp = TempMedia::create(&self.media_root.join(TEMP_SUBDIR), "mp4")
            .await
            .map_err(|e| GenerationError::Transcode(FfmpegError::Io(e)))?;
        if let Err(e) = temp.write(&bytes).await {
            temp.remove().await;
            return Err(GenerationError::Transcode(FfmpegError::Io(e)));
        }

        let filename = format!("{}.gif", uuid::Uuid::new_v4());
        let output_path = self.media_root.join(OUTPUT_SUBDIR).join(&filename);

        let encoded = self.encoder.encode(temp.path(), &output_path).await;
        temp.remove().await;

        match encoded {
            Ok(()) => Ok(TranscodedGif {
                url: format!(
                    "{}/{OUTPUT_SUBDIR}/{filename}",
                    self.public_base.trim_end_matches('/')
                ),
                path: output_path,
            }),
            Err(e) => {
                let _ = tokio::fs::remove_file(&output_path).await;
                Err(GenerationError::Transcode(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use gifforge_providers::ProviderError;

    use super::*;

    struct StaticFetcher(Vec<u8>);

    #[async_trait]
    impl MediaFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    /// Copies the input file as the "GIF".
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

    /// Writes a partial output, then fails.
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
                stderr: "corrupt input".to_string(),
            })
        }
    }

    fn temp_dir_entries(root: &Path) -> usize {
        std::fs::read_dir(root.join(TEMP_SUBDIR))
            .map(|d| d.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn success_leaves_no_temp_file_and_returns_the_public_url() {
        let root = tempfile::tempdir().unwrap();
        let transcoder = MediaTranscoder::new(
            Arc::new(StaticFetcher(b"fake mp4".to_vec())),
            Arc::new(CopyEncoder),
            root.path().to_path_buf(),
            "/media".to_string(),
        );

        let gif = transcoder.transcode("https://cdn/clip.mp4").await.unwrap();
        assert!(gif.path.exists());
        assert!(gif.url.starts_with("/media/ai_gifs/"));
        assert!(gif.url.ends_with(".gif"));
        assert_eq!(temp_dir_entries(root.path()), 0);
    }

    #[tokio::test]
    async fn encode_failure_removes_temp_and_partial_output() {
        let root = tempfile::tempdir().unwrap();
        let transcoder = MediaTranscoder::new(
            Arc::new(StaticFetcher(b"fake mp4".to_vec())),
            Arc::new(FailingEncoder),
            root.path().to_path_buf(),
            "/media".to_string(),
        );

        let err = transcoder.transcode("https://cdn/clip.mp4").await.unwrap_err();
        assert_matches!(err, GenerationError::Transcode(_));
        assert_eq!(temp_dir_entries(root.path()), 0);

        let outputs = std::fs::read_dir(root.path().join(OUTPUT_SUBDIR))
            .map(|d| d.count())
            .unwrap_or(0);
        assert_eq!(outputs, 0, "partial output must not survive");
    }

    #[tokio::test]
    async fn fetch_failure_is_a_download_error() {
        struct Gone;

        #[async_trait]
        impl MediaFetcher for Gone {
            async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
                Err(ProviderError::Api {
                    status: 404,
                    body: "expired".to_string(),
                })
            }
        }

        let root = tempfile::tempdir().unwrap();
        let transcoder = MediaTranscoder::new(
            Arc::new(Gone),
            Arc::new(CopyEncoder),
            root.path().to_path_buf(),
            "/media".to_string(),
        );

        let err = transcoder.transcode("https://cdn/clip.mp4").await.unwrap_err();
        assert_matches!(
            err,
            GenerationError::Download { status: Some(404), detail } if detail == "expired"
        );
    }
}
