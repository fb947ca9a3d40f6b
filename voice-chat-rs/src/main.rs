//! voice-chat-rs: terminal chat companion that speaks its replies.

mod chat;
mod config;
mod console;
mod conversation;
mod error;
mod input;
mod message;
mod narrator;
mod runner;
mod speech;
mod text;

#[cfg(test)]
mod testing;

use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "voice-chat-rs", about = "Chat with an assistant that talks back")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Narrator key (f1, f2, f3, m1, m2, m3, c)
    #[arg(short, long, conflicts_with = "no_narrator")]
    narrator: Option<String>,

    /// Use VOICEPEAK's default narrator
    #[arg(long)]
    no_narrator: bool,

    /// Path to the voicepeak executable
    #[arg(short, long)]
    executable: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr, the conversation owns stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug,hyper=warn,reqwest=warn")
        } else {
            EnvFilter::new("info,hyper=warn,reqwest=warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("voice-chat-rs starting");

    let config = config::Config::load(args.config.as_deref())?;

    let narrator = if args.no_narrator {
        None
    } else {
        args.narrator.or_else(|| config.speech.narrator.clone())
    };
    let options = speech::SpeechOptions {
        narrator,
        executable: args.executable,
    };
    if let Some(key) = options.narrator.as_deref() {
        let table = config.speech.narrator_table();
        if table.resolve(key).is_err() {
            let keys: Vec<&str> = table.keys().collect();
            warn!("Unknown narrator '{key}' (available: {}), speech will fail", keys.join(", "));
        }
    }
    info!(
        "Model: {}, narrator: {}",
        config.chat.model,
        options.narrator.as_deref().unwrap_or("default")
    );

    let chat = Arc::new(chat::OpenAiChatClient::from_env(&config.chat)?);
    let speaker = speech::Speaker::new(&config.speech, Arc::new(runner::SystemRunner));
    let console = Arc::new(console::TerminalConsole::new(std::io::stdout().is_terminal()));

    let (line_tx, line_rx) = mpsc::channel(input::LINE_QUEUE_CAPACITY);
    input::spawn_stdin_reader(line_tx)?;

    let mut conversation = conversation::Conversation::new(
        config.conversation.clone(),
        config.speech.max_chunk_graphemes,
        chat,
        speaker,
        options,
        console,
    );
    conversation.run(line_rx).await;

    info!(
        "Conversation {} after {} messages",
        conversation.state(),
        conversation.history().len()
    );
    Ok(())
}
