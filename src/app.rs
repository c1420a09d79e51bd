use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use shallowseek::{
    ChatSession, GenerationUpdate, Message, Modality, Orchestrator, Phase, Submission, Ticket,
};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: ChatSession,
    pub prompt_cursor: usize, // cursor position in the prompt, in chars

    // Transcript viewport
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub chat_area: Option<Rect>,

    // 0-2 for the ellipsis animation
    pub animation_frame: u8,

    orchestrator: Orchestrator,
    generation_task: Option<JoinHandle<()>>,
    events: UnboundedSender<AppEvent>,
    fun_fact_interval: Duration,
    last_fact_at: Instant,
}

impl App {
    pub fn new(
        orchestrator: Orchestrator,
        fun_fact_interval: Duration,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session: ChatSession::default(),
            prompt_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,

            animation_frame: 0,

            orchestrator,
            generation_task: None,
            events,
            fun_fact_interval,
            last_fact_at: Instant::now(),
        }
    }

    pub fn modality(&self) -> Modality {
        self.session.modality()
    }

    pub fn select_modality(&mut self, modality: Modality) {
        if let Some(ticket) = self.session.select_modality(modality) {
            self.abort_generation(ticket);
        }
        self.prompt_cursor = 0;
        self.chat_scroll = 0;
        info!(%modality, "modality selected");
    }

    pub fn next_modality(&mut self) {
        self.select_modality(self.session.modality().next());
    }

    /// Try to send the current prompt. Returns false if nothing was sent.
    pub fn submit(&mut self) -> bool {
        let submission = self.session.submit(&mut rand::thread_rng());
        match submission {
            Submission::Refused => false,
            Submission::VideoNotice => {
                info!("video generation requested, showing capacity notice");
                true
            }
            Submission::Dispatch {
                ticket,
                modality,
                prompt,
            } => {
                self.prompt_cursor = 0;
                self.last_fact_at = Instant::now();
                self.dispatch(ticket, modality, prompt);
                self.scroll_chat_to_bottom();
                true
            }
        }
    }

    fn dispatch(&mut self, ticket: Ticket, modality: Modality, prompt: String) {
        info!(ticket, %modality, "generation started");

        let orchestrator = self.orchestrator.clone();
        let tx = self.events.clone();
        self.generation_task = Some(tokio::spawn(async move {
            let progress_tx = tx.clone();
            let message = orchestrator
                .run(modality, &prompt, move |update| {
                    let _ = progress_tx.send(AppEvent::GenerationProgress { ticket, update });
                })
                .await;
            let _ = tx.send(AppEvent::GenerationSettled { ticket, message });
        }));
    }

    /// Abandon the in-flight generation, if any.
    pub fn cancel_generation(&mut self) {
        if let Some(ticket) = self.session.cancel() {
            self.abort_generation(ticket);
        }
    }

    fn abort_generation(&mut self, ticket: Ticket) {
        if let Some(task) = self.generation_task.take() {
            task.abort();
            info!(ticket, "generation cancelled");
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.session.dismiss_notice();
    }

    pub fn on_generation_progress(&mut self, ticket: Ticket, update: GenerationUpdate) {
        if !self.session.apply_update(ticket, update) {
            debug!(ticket, "ignoring progress from stale generation");
        }
    }

    pub fn on_generation_settled(&mut self, ticket: Ticket, message: Message) {
        if self.session.settle(ticket, message) {
            self.generation_task = None;
            info!(ticket, "generation settled");
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame and rotate the fun fact (called by Tick event)
    pub fn tick(&mut self) {
        if self.session.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        let fact_due = self.last_fact_at.elapsed() >= self.fun_fact_interval;
        if self.session.fun_fact().is_some() && fact_due {
            self.session.rotate_fun_fact(&mut rand::thread_rng());
            self.last_fact_at = Instant::now();
        }
    }

    pub fn shutdown(&mut self) {
        self.cancel_generation();
    }

    pub fn show_video_notice(&self) -> bool {
        *self.session.phase() == Phase::VideoNotice
    }

    // Prompt editing, cursor counted in chars for UTF-8 safety
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(self.session.prompt(), self.prompt_cursor);
        self.session.prompt_mut().insert(byte_pos, c);
        self.prompt_cursor += 1;
    }

    pub fn delete_char_before_cursor(&mut self) {
        if self.prompt_cursor > 0 {
            self.prompt_cursor -= 1;
            let byte_pos = char_to_byte_index(self.session.prompt(), self.prompt_cursor);
            self.session.prompt_mut().remove(byte_pos);
        }
    }

    pub fn delete_char_at_cursor(&mut self) {
        if self.prompt_cursor < self.session.prompt().chars().count() {
            let byte_pos = char_to_byte_index(self.session.prompt(), self.prompt_cursor);
            self.session.prompt_mut().remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.prompt_cursor = self.prompt_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.session.prompt().chars().count();
        self.prompt_cursor = (self.prompt_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.prompt_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.prompt_cursor = self.session.prompt().chars().count();
    }

    // Transcript scrolling
    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.transcript_lines().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll so the newest message (and the loading indicator) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.transcript_lines();
        let visible_height = self.visible_height();
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered line count of the transcript at the current wrap width.
    fn transcript_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.session.transcript() {
            total_lines = total_lines.saturating_add(1); // sender line
            for line in msg.text.lines() {
                total_lines = total_lines.saturating_add(wrapped_height(line, wrap_width));
            }
            if let Some(url) = &msg.image_url {
                total_lines = total_lines.saturating_add(wrapped_height(url, wrap_width) + 1);
            }
            total_lines = total_lines.saturating_add(1); // blank line after message
        }

        if self.session.is_generating() {
            total_lines = total_lines.saturating_add(2);
        }
        total_lines
    }
}

fn wrapped_height(line: &str, wrap_width: usize) -> u16 {
    // Use character count, not byte length, for proper UTF-8 handling
    let char_count = line.chars().count();
    if char_count == 0 {
        1
    } else {
        (char_count / wrap_width.max(1) + 1) as u16
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
