use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shallowseek::{
    ChatSession, Clock, GenerationJob, GenerationResult, ImageGenerator, JobStatus, Message,
    Modality, Orchestrator, Phase, PollPolicy, Sender, SpeechSynthesizer, Submission,
    TextGenerator,
};

#[derive(Default)]
struct InstantClock {
    sleeps: AtomicUsize,
}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

struct QueuedImages {
    statuses: Mutex<VecDeque<&'static str>>,
    submits: AtomicUsize,
    fetches: AtomicUsize,
}

impl QueuedImages {
    fn new(pending: usize, last: Option<&'static str>) -> Self {
        let mut statuses: VecDeque<&'static str> =
            std::iter::repeat("queued").take(pending).collect();
        statuses.extend(last);
        Self {
            statuses: Mutex::new(statuses),
            submits: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageGenerator for QueuedImages {
    async fn submit_image_job(&self, _prompt: &str) -> GenerationResult<String> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok("cuid-42".to_string())
    }

    async fn fetch_job_status(&self, job_id: &str) -> GenerationResult<GenerationJob> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let status = self.statuses.lock().unwrap().pop_front().unwrap_or("queued");
        let download_urls = if status == "complete" {
            vec!["https://cdn.example/cat.png".to_string()]
        } else {
            Vec::new()
        };
        Ok(GenerationJob {
            id: job_id.to_string(),
            status: JobStatus::parse(status),
            download_urls,
        })
    }
}

struct CannedText {
    reply: Option<String>,
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for CannedText {
    async fn generate_text(&self, _prompt: &str) -> GenerationResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

#[derive(Default)]
struct SilentSpeech {
    spoken: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for SilentSpeech {
    async fn speak(&self, text: &str) -> GenerationResult<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct Harness {
    images: Arc<QueuedImages>,
    text: Arc<CannedText>,
    speech: Arc<SilentSpeech>,
    clock: Arc<InstantClock>,
    orchestrator: Orchestrator,
}

fn harness(images: QueuedImages, reply: Option<&str>) -> Harness {
    let images = Arc::new(images);
    let text = Arc::new(CannedText {
        reply: reply.map(str::to_string),
        calls: AtomicUsize::new(0),
    });
    let speech = Arc::new(SilentSpeech::default());
    let clock = Arc::new(InstantClock::default());
    let orchestrator = Orchestrator::new(
        images.clone(),
        text.clone(),
        speech.clone(),
        clock.clone(),
        PollPolicy::new(Duration::from_secs(5), 10),
    );
    Harness {
        images,
        text,
        speech,
        clock,
        orchestrator,
    }
}

/// Submit the prompt and run the dispatched generation to completion.
async fn send(session: &mut ChatSession, orchestrator: &Orchestrator, prompt: &str) -> Submission {
    session.prompt_mut().push_str(prompt);
    let submission = session.submit(&mut rand::thread_rng());
    if let Submission::Dispatch {
        ticket,
        modality,
        prompt,
    } = &submission
    {
        let message = orchestrator.run(*modality, prompt, |_| {}).await;
        assert!(session.settle(*ticket, message));
    }
    submission
}

fn model_messages(session: &ChatSession) -> Vec<&Message> {
    session
        .transcript()
        .iter()
        .filter(|m| m.sender == Sender::Model)
        .collect()
}

#[tokio::test]
async fn image_completes_on_last_allowed_check() {
    let h = harness(QueuedImages::new(9, Some("complete")), None);
    let mut session = ChatSession::new(Modality::Image);

    send(&mut session, &h.orchestrator, "a cat astronaut").await;

    let replies = model_messages(&session);
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0].image_url.as_deref(),
        Some("https://cdn.example/cat.png")
    );
    assert_eq!(h.images.submits.load(Ordering::SeqCst), 1);
    assert_eq!(h.images.fetches.load(Ordering::SeqCst), 10);
    assert_eq!(h.clock.sleeps.load(Ordering::SeqCst), 9);
    assert_eq!(*session.phase(), Phase::Idle);
    assert!(session.fun_fact().is_none());
}

#[tokio::test]
async fn image_that_never_finishes_yields_one_error() {
    let h = harness(QueuedImages::new(10, None), None);
    let mut session = ChatSession::new(Modality::Image);

    send(&mut session, &h.orchestrator, "a slow painting").await;

    let replies = model_messages(&session);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].is_generic_error());
    assert!(replies[0].image_url.is_none());
    assert_eq!(h.images.fetches.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn failed_render_stops_polling() {
    let h = harness(QueuedImages::new(2, Some("error")), None);
    let mut session = ChatSession::new(Modality::Image);

    send(&mut session, &h.orchestrator, "broken").await;

    assert!(model_messages(&session)[0].is_generic_error());
    assert_eq!(h.images.fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn text_reply_has_emphasis_removed() {
    let h = harness(QueuedImages::new(0, None), Some("*bold* claim"));
    let mut session = ChatSession::new(Modality::Text);

    send(&mut session, &h.orchestrator, "tell me something").await;

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], Message::user("tell me something"));
    assert_eq!(transcript[1].text, "bold claim");
    assert_eq!(h.images.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn audio_speaks_the_prompt_locally() {
    let h = harness(QueuedImages::new(0, None), Some("unused"));
    let mut session = ChatSession::new(Modality::Audio);

    send(&mut session, &h.orchestrator, "greet me").await;

    assert_eq!(*h.speech.spoken.lock().unwrap(), vec!["greet me".to_string()]);
    assert_eq!(
        model_messages(&session)[0].text,
        "Audio generated and playing!"
    );
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.images.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn video_shows_notice_without_calling_providers() {
    let h = harness(QueuedImages::new(0, None), Some("unused"));
    let mut session = ChatSession::new(Modality::Video);

    let submission = send(&mut session, &h.orchestrator, "a short clip").await;

    assert_eq!(submission, Submission::VideoNotice);
    assert_eq!(*session.phase(), Phase::VideoNotice);
    assert!(session.transcript().is_empty());
    assert_eq!(h.images.submits.load(Ordering::SeqCst), 0);
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 0);

    session.dismiss_notice();
    assert_eq!(*session.phase(), Phase::Idle);
}

#[tokio::test]
async fn blank_prompt_is_refused() {
    let h = harness(QueuedImages::new(0, None), Some("unused"));
    let mut session = ChatSession::new(Modality::Text);

    let submission = send(&mut session, &h.orchestrator, "   ").await;

    assert_eq!(submission, Submission::Refused);
    assert!(session.transcript().is_empty());
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn switching_modality_discards_in_flight_result() {
    let h = harness(QueuedImages::new(0, Some("complete")), None);
    let mut session = ChatSession::new(Modality::Image);
    session.prompt_mut().push_str("a lighthouse");

    let Submission::Dispatch {
        ticket,
        modality,
        prompt,
    } = session.submit(&mut rand::thread_rng())
    else {
        panic!("expected dispatch");
    };
    assert!(session.fun_fact().is_some());

    assert_eq!(session.select_modality(Modality::Text), Some(ticket));
    let late = h.orchestrator.run(modality, &prompt, |_| {}).await;

    assert!(!session.settle(ticket, late));
    assert!(session.transcript().is_empty());
    assert!(session.prompt().is_empty());
    assert_eq!(session.modality(), Modality::Text);
    assert_eq!(*session.phase(), Phase::Idle);
}
