use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sam_core::{HistoryTail, IncomingMessage, Persona, Role, SamConfig};
use sam_memory::SessionChatCache;
use sam_reasoning::llm::ChatBackend;
use sam_reasoning::providers::ollama::is_unreachable;
use sam_reasoning::providers::{MockProvider, OllamaClient};
use sam_reasoning::SamEngine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "SAM_CONFIG", default_value = "sam.toml")]
    config: PathBuf,

    /// Write daily-rotated logs to this directory as well as stderr
    #[arg(long, env = "SAM_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Do not (re)create the chat model at startup
    #[arg(long)]
    skip_provision: bool,

    /// Use the mock backend instead of Ollama
    #[arg(long)]
    mock: bool,

    /// Display name used for terminal messages
    #[arg(long, default_value = "User")]
    name: String,

    /// Nickname used for terminal messages
    #[arg(long, default_value = "user")]
    nickname: String,
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sam.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

/// Create the chat model from its base model with the persona baked in.
/// Any failure here is fatal.
async fn provision(client: &OllamaClient, config: &SamConfig, persona: &Persona) {
    match client
        .create_model(&config.llm.chat_model, &config.llm.base_model, &persona.personality)
        .await
    {
        Ok(status) => info!("# Client: {}", status),
        Err(e) if is_unreachable(&e) => {
            error!("Ollama is not running! ({})", client.base_url());
            std::process::exit(1);
        }
        Err(e) => {
            error!("An unexpected error occurred: {:#}", e);
            std::process::exit(1);
        }
    }
}

enum Command<'a> {
    Quit,
    Mood,
    Calm,
    Feel(&'a str, f64),
    Clear,
    Image(&'a str, &'a str),
    Say(&'a str),
    Invalid(&'static str),
}

const FEEL_USAGE: &str = "usage: /feel <emotion> <delta>";
const IMAGE_USAGE: &str = "usage: /image <file> [caption]";

fn parse_command(line: &str) -> Command<'_> {
    match line {
        "quit" | "exit" => return Command::Quit,
        "/mood" => return Command::Mood,
        "/calm" => return Command::Calm,
        "/clear" => return Command::Clear,
        "/feel" => return Command::Invalid(FEEL_USAGE),
        "/image" => return Command::Invalid(IMAGE_USAGE),
        _ => {}
    }

    if let Some(rest) = line.strip_prefix("/feel ") {
        let mut parts = rest.split_whitespace();
        return match (parts.next(), parts.next().map(str::parse::<f64>)) {
            (Some(name), Some(Ok(delta))) => Command::Feel(name, delta),
            _ => Command::Invalid(FEEL_USAGE),
        };
    }

    if let Some(rest) = line.strip_prefix("/image ") {
        let rest = rest.trim();
        return match rest.split_once(char::is_whitespace) {
            Some((file, caption)) => Command::Image(file, caption.trim()),
            None if !rest.is_empty() => Command::Image(rest, ""),
            None => Command::Invalid(IMAGE_USAGE),
        };
    }

    Command::Say(line)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_dir.as_deref());

    info!("Initializing SAM...");
    let config = SamConfig::load_or_default(&args.config);

    let persona = match &config.persona.file {
        Some(path) => Persona::load(path).await,
        None => Persona::default(),
    };

    let backend: Arc<dyn ChatBackend> = if args.mock {
        info!("Using mock backend");
        Arc::new(MockProvider::new())
    } else {
        let client = OllamaClient::from_config(&config.llm)?;
        info!("Using Ollama at {}", client.base_url());
        if args.skip_provision {
            info!("Skipping model provisioning");
        } else {
            provision(&client, &config, &persona).await;
        }
        Arc::new(client)
    };

    let cache = SessionChatCache::new(config.history.max_entries);
    let engine = SamEngine::new(&config, persona, backend, Arc::new(cache.clone()));

    let (dominant, value) = engine.emotions().dominant().await;
    info!("Emotions calm, dominant: {:?} ({:.3})", dominant, value);

    println!("SAM online. Type 'quit' to exit, '/image <file> [caption]' to send an image.");

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        let message = match parse_command(trimmed) {
            Command::Quit => break,
            Command::Mood => {
                let (dominant, value) = engine.emotions().dominant().await;
                let snapshot = engine.emotions().snapshot().await;
                println!("Dominant: {} ({:.3})", dominant.join(", "), value);
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                continue;
            }
            Command::Calm => {
                engine.emotions().calm().await;
                println!("Calmed.");
                continue;
            }
            Command::Feel(name, delta) => {
                let (dominant, value) = engine.emotions().apply([(name, delta)]).await;
                println!("Dominant: {} ({:.3})", dominant.join(", "), value);
                continue;
            }
            Command::Clear => {
                cache.clear().await;
                continue;
            }
            Command::Invalid(usage) => {
                println!("{}", usage);
                continue;
            }
            Command::Image(file, caption) => {
                IncomingMessage::text(&args.name, &args.nickname, caption).with_image(file, Vec::new())
            }
            Command::Say(text) => IncomingMessage::text(&args.name, &args.nickname, text),
        };

        if config.history.tail == HistoryTail::InFlightIncluded {
            cache
                .record_user_message(&args.name, &args.nickname, &message.content)
                .await;
        }

        match engine.reply(&message).await {
            Ok(reply) => {
                if config.history.tail == HistoryTail::Settled {
                    cache
                        .record_user_message(&args.name, &args.nickname, &message.content)
                        .await;
                }
                cache.record(Role::Assistant, reply.clone()).await;
                for chunk in engine.format(&reply) {
                    println!("\nSAM: {}\n", chunk);
                }
            }
            Err(e) => {
                error!("Error replying: {:#}", e);
                println!("\n[System Error]: {}\n", e);
            }
        }
    }

    Ok(())
}
