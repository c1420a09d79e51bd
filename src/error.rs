//! Error types for generation and configuration

use thiserror::Error;

use crate::modality::Modality;

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Failures along any generation path. None of these reach the user verbatim;
/// the orchestrator collapses them into a single transcript message.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("image job could not be created: {0}")]
    Submission(String),

    #[error("image job status could not be fetched: {0}")]
    Fetch(String),

    #[error("image job did not complete after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("image job ended with status '{status}'")]
    JobFailed { status: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("speech synthesis failed: {0}")]
    Speech(String),

    #[error("{} generation is not available", .0.display_name())]
    Unsupported(Modality),
}

/// Problems found while loading or validating configuration at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing {name}: set {env} or add it to the config file")]
    MissingKey { name: &'static str, env: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
