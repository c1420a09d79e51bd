use serde::{Deserialize, Serialize};

/// The kind of content being generated. Exactly one is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    #[default]
    Text,
    Image,
    Video,
    Audio,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Audio => "audio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(Modality::Text),
            "image" => Some(Modality::Image),
            "video" => Some(Modality::Video),
            "audio" => Some(Modality::Audio),
            _ => None,
        }
    }

    pub fn all() -> [Modality; 4] {
        [Modality::Text, Modality::Image, Modality::Video, Modality::Audio]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Modality::Text => "Text",
            Modality::Image => "Image",
            Modality::Video => "Video",
            Modality::Audio => "Audio",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Modality::Text => "Ask anything...",
            Modality::Image => "Generate any image...",
            Modality::Video => "Generate any video...",
            Modality::Audio => "Generate any audio...",
        }
    }

    /// Next modality in tab order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            Modality::Text => Modality::Image,
            Modality::Image => Modality::Video,
            Modality::Video => Modality::Audio,
            Modality::Audio => Modality::Text,
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
