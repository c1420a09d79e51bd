use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::SpeechSynthesizer;
use crate::error::{GenerationError, GenerationResult};

/// Speaks text through the platform's TTS command (`say`, `espeak`, ...).
/// The text is fed on stdin so it is never parsed as options. Playback runs
/// in the background; only a failure to launch or feed the command is
/// reported.
#[derive(Debug, Clone)]
pub struct SystemSpeech {
    program: String,
    args: Vec<String>,
}

impl SystemSpeech {
    /// `command` may carry extra arguments, e.g. `"espeak -s 150"`.
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SystemSpeech {
    async fn speak(&self, text: &str) -> GenerationResult<()> {
        if self.program.is_empty() {
            return Err(GenerationError::Speech("no speech command configured".to_string()));
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| GenerationError::Speech(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let fed = async {
                stdin.write_all(text.as_bytes()).await?;
                stdin.shutdown().await
            };
            if let Err(e) = fed.await {
                let _ = child.start_kill();
                return Err(GenerationError::Speech(format!(
                    "failed to write to {}: {}",
                    self.program, e
                )));
            }
        }

        debug!(program = %self.program, "speech playback started");

        let program = self.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    warn!(%program, %status, "speech command exited with failure");
                }
                Err(e) => warn!(%program, error = %e, "speech command wait failed"),
                _ => {}
            }
        });

        Ok(())
    }
}
