pub mod ai;
pub mod config;
pub mod error;
pub mod facts;
pub mod modality;
pub mod orchestrator;
pub mod poll;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{
    BackendClient, GeminiClient, GenerationJob, ImageGenerator, JobStatus, MagicHourClient,
    SpeechSynthesizer, SystemSpeech, TextGenerator,
};
pub use config::{Config, Settings};
pub use error::{ConfigError, GenerationError, GenerationResult};
pub use modality::Modality;
pub use orchestrator::{GenerationUpdate, Orchestrator};
pub use poll::{Clock, PollPolicy, TokioClock};
pub use session::{ChatSession, Phase, Progress, Submission, Ticket};
pub use state::{Message, Sender};
