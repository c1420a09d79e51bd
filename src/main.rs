use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use shallowseek::state::{VIDEO_LIMIT_TEXT, VIDEO_LIMIT_TITLE};
use shallowseek::{
    BackendClient, ChatSession, Config, GenerationUpdate, Modality, Orchestrator, Sender,
    Settings, Submission,
};

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "shallowseek", version)]
#[command(about = "Chat-style text, image and audio generation in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single generation without the TUI
    Generate {
        /// Prompt to send
        prompt: String,
        /// text, image, video or audio
        #[arg(short, long, default_value = "text", value_parser = parse_modality)]
        modality: Modality,
    },
    /// Send a prompt to a local backend exposing POST /api/{type}
    Backend {
        /// Prompt to send
        prompt: String,
        /// text, image, video or audio
        #[arg(short, long, default_value = "text", value_parser = parse_modality)]
        modality: Modality,
        /// Backend base URL (defaults to backend_url from the config file)
        #[arg(long)]
        url: Option<String>,
    },
    /// Store API keys and endpoints in the config file
    Configure {
        #[arg(long)]
        image_key: Option<String>,
        #[arg(long)]
        text_key: Option<String>,
        #[arg(long)]
        backend_url: Option<String>,
    },
}

fn parse_modality(s: &str) -> Result<Modality, String> {
    Modality::from_str(s).ok_or_else(|| format!("unknown modality '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let _guard = logging::init_file()?;
            let settings = load_settings()?;
            run_tui(settings).await
        }
        Some(Commands::Generate { prompt, modality }) => {
            logging::init_stderr();
            let settings = load_settings()?;
            generate_once(&settings, modality, &prompt).await
        }
        Some(Commands::Backend {
            prompt,
            modality,
            url,
        }) => {
            logging::init_stderr();
            query_backend(url, modality, &prompt).await
        }
        Some(Commands::Configure {
            image_key,
            text_key,
            backend_url,
        }) => configure(image_key, text_key, backend_url),
    }
}

/// Fail fast on missing keys before touching the terminal.
fn load_settings() -> Result<Settings> {
    let config = Config::load().context("Failed to load config")?;
    let settings = config.resolve()?;
    info!(
        image_base_url = %settings.image_base_url,
        poll_interval = ?settings.poll.interval,
        poll_attempts = settings.poll.max_attempts,
        poll_max_wait = ?settings.poll.max_wait(),
        "configuration loaded"
    );
    Ok(settings)
}

async fn run_tui(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::from_settings(&settings);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(orchestrator, settings.fun_fact_interval, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn generate_once(settings: &Settings, modality: Modality, prompt: &str) -> Result<()> {
    let mut session = ChatSession::new(modality);
    session.prompt_mut().push_str(prompt);

    let submission = session.submit(&mut rand::thread_rng());
    match submission {
        Submission::Refused => bail!("Prompt is empty"),
        Submission::VideoNotice => {
            println!("{}", VIDEO_LIMIT_TITLE);
            println!("{}", VIDEO_LIMIT_TEXT);
            return Ok(());
        }
        Submission::Dispatch {
            ticket,
            modality,
            prompt,
        } => {
            let orchestrator = Orchestrator::from_settings(settings);
            let max_attempts = orchestrator.policy().max_attempts;
            let message = orchestrator
                .run(modality, &prompt, |update| match update {
                    GenerationUpdate::JobSubmitted { job_id } => {
                        eprintln!("Image job {} submitted", job_id)
                    }
                    GenerationUpdate::JobPolled { attempt, status } => {
                        eprintln!("Check {}/{}: {}", attempt, max_attempts, status.as_str())
                    }
                })
                .await;
            session.settle(ticket, message);
        }
    }

    for message in session.transcript() {
        let who = match message.sender {
            Sender::User => "You",
            Sender::Model => "AI",
        };
        if !message.text.is_empty() {
            println!("{}: {}", who, message.text);
        }
        if let Some(url) = &message.image_url {
            println!("{}: {}", who, url);
        }
    }

    Ok(())
}

async fn query_backend(url: Option<String>, modality: Modality, prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Prompt is empty");
    }

    let base_url = match url {
        Some(url) => url,
        None => Config::load()?
            .backend_url
            .context("No backend URL: pass --url or set backend_url in the config file")?,
    };

    let client = BackendClient::new(&base_url);
    info!(endpoint = %client.endpoint(modality), "querying backend");
    let result = client.generate(modality, prompt).await?;
    println!("{}", result);
    Ok(())
}

fn configure(
    image_key: Option<String>,
    text_key: Option<String>,
    backend_url: Option<String>,
) -> Result<()> {
    if image_key.is_none() && text_key.is_none() && backend_url.is_none() {
        bail!("Nothing to configure: pass --image-key, --text-key or --backend-url");
    }

    let path = Config::update(|config| {
        if image_key.is_some() {
            config.image_api_key = image_key;
        }
        if text_key.is_some() {
            config.text_api_key = text_key;
        }
        if backend_url.is_some() {
            config.backend_url = backend_url;
        }
    })
    .context("Failed to update config")?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
