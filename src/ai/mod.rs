pub mod backend;
pub mod gemini;
pub mod magic_hour;
pub mod speech;

pub use backend::BackendClient;
pub use gemini::GeminiClient;
pub use magic_hour::{GenerationJob, JobStatus, MagicHourClient};
pub use speech::SystemSpeech;

use async_trait::async_trait;

use crate::error::GenerationResult;

/// Asynchronous image generation: create a job, then inspect it.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn submit_image_job(&self, prompt: &str) -> GenerationResult<String>;
    async fn fetch_job_status(&self, job_id: &str) -> GenerationResult<GenerationJob>;
}

/// Single-shot text generation. `Ok(None)` means the provider answered but
/// produced no usable candidate.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> GenerationResult<Option<String>>;
}

/// Local on-device speech playback.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> GenerationResult<()>;
}
