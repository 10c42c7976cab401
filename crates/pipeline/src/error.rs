//! The pipeline's single stage-tagged failure type.

use gifforge_core::ffmpeg::FfmpegError;
use gifforge_providers::ProviderError;

/// One discrete step of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reserve,
    Enhance,
    Synthesize,
    Animate,
    Transcode,
    Record,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Reserve => "reserve",
            Stage::Enhance => "enhance",
            Stage::Synthesize => "synthesize",
            Stage::Animate => "animate",
            Stage::Transcode => "transcode",
            Stage::Record => "record",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one generation job.
///
/// Admission denials (`NoActiveSubscription`, `QuotaExceeded`) happen
/// before any generation cost; everything else is a stage failure that
/// does not refund the consumed quota slot.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no active subscription")]
    NoActiveSubscription,

    #[error("generation quota exceeded ({used}/{limit})")]
    QuotaExceeded { used: i32, limit: i32 },

    /// A provider rejected a call. `status` is absent for transport-level
    /// failures that never produced a response.
    #[error("{stage} provider error (status {status:?}): {body}")]
    Provider {
        stage: Stage,
        status: Option<u16>,
        body: String,
    },

    /// A provider answered with an unexpected shape, or the animate poll
    /// budget ran out.
    #[error("{stage} protocol error: {detail}")]
    Protocol { stage: Stage, detail: String },

    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("video download failed (status {status:?}): {detail}")]
    Download {
        status: Option<u16>,
        detail: String,
    },

    #[error("transcode failed: {0}")]
    Transcode(#[source] FfmpegError),

    #[error("{stage} database error: {source}")]
    Database {
        stage: Stage,
        #[source]
        source: sqlx::Error,
    },
}

impl GenerationError {
    /// The stage this failure is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            GenerationError::NoActiveSubscription | GenerationError::QuotaExceeded { .. } => {
                Stage::Reserve
            }
            GenerationError::Provider { stage, .. } | GenerationError::Protocol { stage, .. } => {
                *stage
            }
            GenerationError::Decode(_) => Stage::Synthesize,
            GenerationError::Download { .. } | GenerationError::Transcode(_) => Stage::Transcode,
            GenerationError::Database { stage, .. } => *stage,
        }
    }

    /// Wrap a provider-call failure with the stage it happened in.
    pub(crate) fn from_provider(stage: Stage, err: ProviderError) -> Self {
        match err {
            ProviderError::Request(e) => GenerationError::Provider {
                stage,
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            },
            ProviderError::Api { status, body } => GenerationError::Provider {
                stage,
                status: Some(status),
                body,
            },
            ProviderError::Protocol(detail) => GenerationError::Protocol { stage, detail },
        }
    }

    /// Wrap a failure fetching the finished video.
    pub(crate) fn from_download(err: ProviderError) -> Self {
        match err {
            ProviderError::Request(e) => GenerationError::Download {
                status: e.status().map(|s| s.as_u16()),
                detail: e.to_string(),
            },
            ProviderError::Api { status, body } => GenerationError::Download {
                status: Some(status),
                detail: body,
            },
            ProviderError::Protocol(detail) => GenerationError::Download {
                status: None,
                detail,
            },
        }
    }
}
