//! The GIF generation pipeline.
//!
//! One job runs to completion inside the calling task, in strict stage
//! order:
//!
//! ```text
//! RESERVE -> ENHANCE -> SYNTHESIZE -> ANIMATE -> TRANSCODE -> RECORD
//! ```
//!
//! RESERVE consumes one quota slot before any generation cost is
//! incurred; ENHANCE can never fail (it degrades to the raw prompt);
//! every later stage maps its failure into the single stage-tagged
//! [`GenerationError`]. The quota slot is NOT refunded when a stage
//! fails.

pub mod animate;
pub mod enhance;
pub mod error;
pub mod orchestrator;
pub mod quota;
pub mod record;
pub mod synthesize;
pub mod transcode;

pub use animate::{AnimationTaskController, PollPolicy};
pub use enhance::PromptEnhancer;
pub use error::{GenerationError, Stage};
pub use orchestrator::GifGenerator;
pub use quota::{PgSubscriptionStore, QuotaReservation, SubscriptionStore};
pub use record::{PgRecorder, Recorder};
pub use synthesize::ImageSynthesizer;
pub use transcode::{FfmpegGifEncoder, GifEncoder, MediaTranscoder, TranscodedGif};
