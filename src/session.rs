//! Chat session state machine
//!
//! `Idle -> Generating(Submitting -> Polling) -> Idle`, plus `VideoNotice`
//! for the capacity-limited video modality. Each dispatched generation gets a
//! ticket; results carrying an outdated ticket are dropped.

use rand::Rng;
use tracing::debug;

use crate::ai::JobStatus;
use crate::facts::random_fact;
use crate::modality::Modality;
use crate::orchestrator::GenerationUpdate;
use crate::state::Message;

pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Submitting,
    Polling {
        job_id: String,
        attempt: u32,
        status: Option<JobStatus>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating {
        modality: Modality,
        ticket: Ticket,
        progress: Progress,
        fun_fact: Option<&'static str>,
    },
    VideoNotice,
}

/// What the caller must do after a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Dispatch {
        ticket: Ticket,
        modality: Modality,
        prompt: String,
    },
    VideoNotice,
    Refused,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    modality: Modality,
    prompt: String,
    transcript: Vec<Message>,
    phase: Phase,
    next_ticket: Ticket,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Modality::default())
    }
}

impl ChatSession {
    pub fn new(modality: Modality) -> Self {
        Self {
            modality,
            prompt: String::new(),
            transcript: Vec::new(),
            phase: Phase::Idle,
            next_ticket: 1,
        }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.phase, Phase::Generating { .. })
    }

    pub fn current_ticket(&self) -> Option<Ticket> {
        match self.phase {
            Phase::Generating { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    pub fn fun_fact(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Generating { fun_fact, .. } => fun_fact,
            _ => None,
        }
    }

    /// The generate affordance is enabled only when idle with a non-blank prompt.
    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Idle && !self.prompt.trim().is_empty()
    }

    /// Switch modality. Transcript and prompt are cleared unconditionally.
    /// Returns the ticket of a generation that was abandoned, if any.
    pub fn select_modality(&mut self, modality: Modality) -> Option<Ticket> {
        let abandoned = self.current_ticket();
        self.modality = modality;
        self.prompt.clear();
        self.transcript.clear();
        self.phase = Phase::Idle;
        if let Some(ticket) = abandoned {
            debug!(ticket, %modality, "modality switched, discarding in-flight generation");
        }
        abandoned
    }

    pub fn submit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Submission {
        if !self.can_submit() {
            return Submission::Refused;
        }

        if self.modality == Modality::Video {
            self.phase = Phase::VideoNotice;
            return Submission::VideoNotice;
        }

        let prompt = std::mem::take(&mut self.prompt);
        self.transcript.push(Message::user(prompt.clone()));

        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let fun_fact = (self.modality == Modality::Image).then(|| random_fact(rng));
        self.phase = Phase::Generating {
            modality: self.modality,
            ticket,
            progress: Progress::Submitting,
            fun_fact,
        };

        Submission::Dispatch {
            ticket,
            modality: self.modality,
            prompt,
        }
    }

    pub fn dismiss_notice(&mut self) {
        if self.phase == Phase::VideoNotice {
            self.phase = Phase::Idle;
        }
    }

    /// Record progress for the in-flight generation. Stale tickets are ignored.
    pub fn apply_update(&mut self, ticket: Ticket, update: GenerationUpdate) -> bool {
        let Phase::Generating {
            ticket: current,
            progress,
            ..
        } = &mut self.phase
        else {
            return false;
        };
        if *current != ticket {
            return false;
        }

        match update {
            GenerationUpdate::JobSubmitted { job_id } => {
                *progress = Progress::Polling {
                    job_id,
                    attempt: 0,
                    status: None,
                };
            }
            GenerationUpdate::JobPolled { attempt, status } => {
                if let Progress::Polling {
                    attempt: a,
                    status: s,
                    ..
                } = progress
                {
                    *a = attempt;
                    *s = Some(status);
                }
            }
        }
        true
    }

    /// Append the settled result and return to idle. Stale tickets are dropped.
    pub fn settle(&mut self, ticket: Ticket, message: Message) -> bool {
        if self.current_ticket() != Some(ticket) {
            debug!(ticket, "dropping result of abandoned generation");
            return false;
        }
        self.transcript.push(message);
        self.phase = Phase::Idle;
        true
    }

    /// Abandon the in-flight generation without adding a transcript entry.
    pub fn cancel(&mut self) -> Option<Ticket> {
        let ticket = self.current_ticket()?;
        self.phase = Phase::Idle;
        Some(ticket)
    }

    /// Pick a new fun fact while an image generation is outstanding.
    pub fn rotate_fun_fact<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        match &mut self.phase {
            Phase::Generating {
                modality: Modality::Image,
                fun_fact,
                ..
            } => {
                *fun_fact = Some(random_fact(rng));
                true
            }
            _ => false,
        }
    }
}
