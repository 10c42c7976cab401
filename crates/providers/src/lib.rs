//! HTTP clients for the external generation services.
//!
//! One client per provider, each holding an explicit config struct (no
//! process-wide settings):
//!
//! - [`enhance::TextCompletionClient`] — prompt enhancement.
//! - [`image::ImageSynthesisClient`] — text-to-image synthesis.
//! - [`video::AnimationClient`] — image-to-video submission + polling.
//! - [`fetch::HttpMediaFetcher`] — plain GET of finished media.
//!
//! The [`traits`] module defines the seams the pipeline consumes, so
//! tests can swap any provider for an in-memory fake.

pub mod enhance;
pub mod error;
pub mod fetch;
pub mod image;
pub mod traits;
pub mod video;

pub use error::ProviderError;
pub use traits::{ImageProvider, MediaFetcher, TaskStatus, TextCompletionProvider, VideoProvider};
