//! FFmpeg transcoding: downloaded provider video to a looping GIF.
//!
//! The compression strategy is a single filter pass that drops the frame
//! rate and caps the width while preserving aspect ratio, trading
//! fidelity for file size.

use std::path::Path;

/// Error type for ffmpeg operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("input video not found: {0}")]
    InputNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the `-vf` filter expression for the GIF pass.
///
/// `min(max_width,iw)` caps the width without ever upscaling; `-2` keeps
/// the aspect ratio with an even height, which every decoder accepts.
pub fn gif_filter(max_width: u32, fps: u32) -> String {
    format!("fps={fps},scale='min({max_width},iw)':-2:flags=lanczos")
}

/// Transcode a video file into a looping GIF.
///
/// Runs `ffmpeg -y -i <input> -vf <filter> -loop 0 <output>`. The output
/// loops forever (`-loop 0`). Callers own both paths; a failed run may
/// leave a partial output file behind, which callers must remove before
/// surfacing the error.
pub async fn transcode_to_gif(
    input: &Path,
    output: &Path,
    max_width: u32,
    fps: u32,
) -> Result<(), FfmpegError> {
    if !input.exists() {
        return Err(FfmpegError::InputNotFound(
            input.to_string_lossy().to_string(),
        ));
    }
    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let result = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input)
        .args(["-vf", &gif_filter(max_width, fps), "-loop", "0"])
        .arg(output)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !result.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: result.status.code(),
            stderr: String::from_utf8_lossy(&result.stderr).to_string(),
        });
    }

    Ok(())
}
