//! Per-modality generation dispatch
//!
//! The orchestrator owns no transcript state. It runs one generation and
//! returns the message to append; `ChatSession` decides whether that message
//! is still wanted.

use std::sync::Arc;
use tracing::{error, info};

use crate::ai::{
    GeminiClient, ImageGenerator, JobStatus, MagicHourClient, SpeechSynthesizer, SystemSpeech,
    TextGenerator,
};
use crate::config::Settings;
use crate::error::{GenerationError, GenerationResult};
use crate::modality::Modality;
use crate::poll::{poll_job, Clock, PollPolicy, TokioClock};
use crate::state::{Message, AUDIO_PLAYING_TEXT, NO_CANDIDATES_TEXT};

/// Progress notifications emitted while a generation is outstanding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationUpdate {
    JobSubmitted { job_id: String },
    JobPolled { attempt: u32, status: JobStatus },
}

#[derive(Clone)]
pub struct Orchestrator {
    images: Arc<dyn ImageGenerator>,
    text: Arc<dyn TextGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl Orchestrator {
    pub fn new(
        images: Arc<dyn ImageGenerator>,
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        clock: Arc<dyn Clock>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            images,
            text,
            speech,
            clock,
            policy,
        }
    }

    /// Wire up the real providers from validated settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(MagicHourClient::new(
                &settings.image_base_url,
                &settings.image_api_key,
            )),
            Arc::new(GeminiClient::new(
                &settings.text_endpoint,
                &settings.text_api_key,
            )),
            Arc::new(SystemSpeech::new(&settings.speech_command)),
            Arc::new(TokioClock),
            settings.poll,
        )
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Run one generation and return the model message to append. Every
    /// failure becomes the generic error message; details go to the log.
    pub async fn run<F>(&self, modality: Modality, prompt: &str, on_update: F) -> Message
    where
        F: Fn(GenerationUpdate) + Send + Sync,
    {
        match self.generate(modality, prompt, on_update).await {
            Ok(message) => message,
            Err(e) => {
                error!(%modality, error = %e, "Error generating content");
                Message::generic_error()
            }
        }
    }

    pub async fn generate<F>(
        &self,
        modality: Modality,
        prompt: &str,
        on_update: F,
    ) -> GenerationResult<Message>
    where
        F: Fn(GenerationUpdate) + Send + Sync,
    {
        match modality {
            Modality::Text => self.generate_text(prompt).await,
            Modality::Image => self.generate_image(prompt, &on_update).await,
            Modality::Audio => {
                self.speech.speak(prompt).await?;
                Ok(Message::model(AUDIO_PLAYING_TEXT))
            }
            Modality::Video => Err(GenerationError::Unsupported(Modality::Video)),
        }
    }

    async fn generate_text(&self, prompt: &str) -> GenerationResult<Message> {
        match self.text.generate_text(prompt).await? {
            Some(text) => Ok(Message::model(strip_emphasis(&text))),
            None => Ok(Message::model(NO_CANDIDATES_TEXT)),
        }
    }

    async fn generate_image<F>(&self, prompt: &str, on_update: &F) -> GenerationResult<Message>
    where
        F: Fn(GenerationUpdate) + Send + Sync,
    {
        let job_id = self.images.submit_image_job(prompt).await?;
        info!(%job_id, "image job submitted, polling");
        on_update(GenerationUpdate::JobSubmitted {
            job_id: job_id.clone(),
        });

        let url = poll_job(
            self.images.as_ref(),
            &job_id,
            &self.policy,
            self.clock.as_ref(),
            |attempt, status| {
                on_update(GenerationUpdate::JobPolled {
                    attempt,
                    status: status.clone(),
                })
            },
        )
        .await?;

        Ok(Message::image(url))
    }
}

/// Drop markdown emphasis markers from provider text.
pub fn strip_emphasis(text: &str) -> String {
    text.replace('*', "")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub struct FixedText {
        pub reply: Mutex<Option<GenerationResult<Option<String>>>>,
        pub calls: AtomicUsize,
    }

    impl FixedText {
        pub fn new(reply: GenerationResult<Option<String>>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FixedText {
        async fn generate_text(&self, _prompt: &str) -> GenerationResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.lock().unwrap().take().unwrap_or(Ok(None))
        }
    }

    #[derive(Default)]
    pub struct RecordingSpeech {
        pub spoken: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSpeech {
        async fn speak(&self, text: &str) -> GenerationResult<()> {
            if self.fail {
                return Err(GenerationError::Speech("no audio device".to_string()));
            }
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }
}
