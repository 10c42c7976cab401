use std::path::PathBuf;
use std::time::Duration;

use gifforge_pipeline::PollPolicy;
use gifforge_providers::enhance::EnhanceConfig;
use gifforge_providers::image::ImageProviderConfig;
use gifforge_providers::video::VideoProviderConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `900`).
    ///
    /// Generation runs synchronously inside the request and the remote
    /// animation alone takes tens of seconds to minutes, so this must
    /// stay well above typical provider latency.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `900`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
        }
    }
}

/// Media storage configuration.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Root directory for temp downloads and finished GIFs
    /// (default: `media`).
    pub media_root: PathBuf,
    /// URL prefix the media root is served under (default: `/media`).
    pub public_base: String,
    /// Caption font file; falls back to system faces when unset or
    /// unreadable.
    pub font_path: Option<PathBuf>,
}

impl MediaConfig {
    /// | Env Var             | Default   |
    /// |---------------------|-----------|
    /// | `MEDIA_ROOT`        | `media`   |
    /// | `MEDIA_PUBLIC_BASE` | `/media`  |
    /// | `FONT_PATH`         | *(unset)* |
    pub fn from_env() -> Self {
        Self {
            media_root: std::env::var("MEDIA_ROOT")
                .unwrap_or_else(|_| "media".into())
                .into(),
            public_base: std::env::var("MEDIA_PUBLIC_BASE").unwrap_or_else(|_| "/media".into()),
            font_path: std::env::var("FONT_PATH").ok().map(PathBuf::from),
        }
    }
}

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seconds between animation status polls (default: `5`).
    pub poll_interval_secs: u64,
    /// Status polls before the animation wait gives up (default: `120`).
    pub poll_max_attempts: u32,
    /// GIF output width cap in pixels (default: `480`).
    pub gif_max_width: u32,
    /// GIF output frame rate (default: `12`).
    pub gif_fps: u32,
}

impl PipelineConfig {
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `POLL_INTERVAL_SECS` | `5`     |
    /// | `POLL_MAX_ATTEMPTS`  | `120`   |
    /// | `GIF_MAX_WIDTH`      | `480`   |
    /// | `GIF_FPS`            | `12`    |
    pub fn from_env() -> Self {
        Self {
            poll_interval_secs: env_parse("POLL_INTERVAL_SECS", 5),
            poll_max_attempts: env_parse("POLL_MAX_ATTEMPTS", 120),
            gif_max_width: env_parse("GIF_MAX_WIDTH", 480),
            gif_fps: env_parse("GIF_FPS", 12),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.poll_max_attempts,
        }
    }
}

/// Provider endpoints and credentials.
///
/// Built here and passed into each client constructor; no client reads
/// process-wide settings on its own.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// Prompt enhancement; `None` disables the stage (pass-through).
    pub enhance: Option<EnhanceConfig>,
    pub image: ImageProviderConfig,
    pub video: VideoProviderConfig,
}

/// Default text-to-image endpoint.
const DEFAULT_IMAGE_API_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";

/// Default image-to-video API base.
const DEFAULT_VIDEO_API_URL: &str = "https://api.dev.runwayml.com/v1";

impl ProvidersConfig {
    /// | Env Var             | Default / Required                      |
    /// |---------------------|-----------------------------------------|
    /// | `IMAGE_API_URL`     | HF stable-diffusion-xl inference URL    |
    /// | `IMAGE_API_KEY`     | **required**                            |
    /// | `VIDEO_API_URL`     | `https://api.dev.runwayml.com/v1`       |
    /// | `VIDEO_API_KEY`     | **required**                            |
    /// | `VIDEO_API_VERSION` | `2024-11-06`                            |
    /// | `VIDEO_MODEL`       | `gen4_turbo`                            |
    /// | `VIDEO_DURATION_SECS` | `3`                                   |
    /// | `VIDEO_RATIO`       | `960:960`                               |
    /// | `ENHANCE_API_URL` + `ENHANCE_API_KEY` | *(both unset: stage disabled)* |
    pub fn from_env() -> Self {
        let image = ImageProviderConfig {
            api_url: std::env::var("IMAGE_API_URL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_API_URL.into()),
            api_key: std::env::var("IMAGE_API_KEY").expect("IMAGE_API_KEY must be set"),
        };

        let mut video = VideoProviderConfig::with_defaults(
            std::env::var("VIDEO_API_URL").unwrap_or_else(|_| DEFAULT_VIDEO_API_URL.into()),
            std::env::var("VIDEO_API_KEY").expect("VIDEO_API_KEY must be set"),
        );
        if let Ok(version) = std::env::var("VIDEO_API_VERSION") {
            video.api_version = version;
        }
        if let Ok(model) = std::env::var("VIDEO_MODEL") {
            video.model = model;
        }
        if let Ok(duration) = std::env::var("VIDEO_DURATION_SECS") {
            video.duration_secs = duration.parse().expect("VIDEO_DURATION_SECS must be a u32");
        }
        if let Ok(ratio) = std::env::var("VIDEO_RATIO") {
            video.ratio = ratio;
        }

        let enhance = match (
            std::env::var("ENHANCE_API_URL"),
            std::env::var("ENHANCE_API_KEY"),
        ) {
            (Ok(api_url), Ok(api_key)) => Some(EnhanceConfig { api_url, api_key }),
            _ => None,
        };

        Self {
            enhance,
            image,
            video,
        }
    }
}

/// Parse an env var or fall back to `default`.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T
where
    T::Err: std::fmt::Debug,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid value: {e:?}")),
        Err(_) => default,
    }
}
