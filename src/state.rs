//! UI-agnostic transcript types
//!
//! Shared by the terminal UI and the headless CLI; nothing here depends on a
//! specific front end.

use serde::{Deserialize, Serialize};

/// Shown for every failed generation regardless of cause.
pub const GENERIC_ERROR_TEXT: &str = "Error generating content. Please try again.";
pub const NO_CANDIDATES_TEXT: &str = "No candidates found in the response.";
pub const AUDIO_PLAYING_TEXT: &str = "Audio generated and playing!";
pub const VIDEO_LIMIT_TITLE: &str = "Video Generation Limit";
pub const VIDEO_LIMIT_TEXT: &str =
    "Due to limited API keys for video generation, only one video can be created at this time.";

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Model,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            image_url: None,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Model,
            text: text.into(),
            image_url: None,
        }
    }

    /// Model reply carrying only an asset URL.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            sender: Sender::Model,
            text: String::new(),
            image_url: Some(url.into()),
        }
    }

    pub fn generic_error() -> Self {
        Self::model(GENERIC_ERROR_TEXT)
    }

    pub fn is_generic_error(&self) -> bool {
        self.sender == Sender::Model && self.text == GENERIC_ERROR_TEXT
    }
}
