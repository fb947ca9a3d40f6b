//! Conversation orchestration with state machine.
//!
//! AWAITING_PERSONA → CONVERSING → ENDED
//!
//! Lines arrive through a bounded channel and are handled one at a time by
//! the single [`Conversation`] that owns the history, so a turn (chat
//! request, then every chunk's synthesize/play/delete) always finishes
//! before the next line is looked at.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::chat::ChatBackend;
use crate::config::ConversationConfig;
use crate::console::Console;
use crate::error::Result;
use crate::message::Message;
use crate::speech::{Speaker, SpeechOptions};
use crate::text::{grapheme_count, split_into_chunks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    AwaitingPersona,
    Conversing,
    Ended,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingPersona => write!(f, "AWAITING_PERSONA"),
            Self::Conversing => write!(f, "CONVERSING"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}

/// What the driver should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Conversation {
    settings: ConversationConfig,
    max_chunk_graphemes: usize,
    state: ConversationState,
    history: Vec<Message>,
    chat: Arc<dyn ChatBackend>,
    speaker: Speaker,
    options: SpeechOptions,
    console: Arc<dyn Console>,
}

impl Conversation {
    pub fn new(
        settings: ConversationConfig,
        max_chunk_graphemes: usize,
        chat: Arc<dyn ChatBackend>,
        speaker: Speaker,
        options: SpeechOptions,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            settings,
            max_chunk_graphemes,
            state: ConversationState::AwaitingPersona,
            history: Vec::new(),
            chat,
            speaker,
            options,
            console,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Print the greeting, then consume lines until the farewell phrase or
    /// until the sender side closes.
    pub async fn run(&mut self, mut lines: mpsc::Receiver<String>) {
        self.console.system(&self.settings.greeting);

        while let Some(line) = lines.recv().await {
            if self.handle_line(line).await == Flow::Exit {
                return;
            }
        }

        info!("Input closed, ending conversation");
        self.transition(ConversationState::Ended);
    }

    /// Handle one input line to completion.
    pub async fn handle_line(&mut self, line: String) -> Flow {
        match self.state {
            ConversationState::AwaitingPersona => {
                info!("Persona set ({} chars)", line.chars().count());
                self.history.push(Message::system(line));
                self.console.system(&self.settings.acknowledgment);
                self.transition(ConversationState::Conversing);
                Flow::Continue
            }
            ConversationState::Conversing if line == self.settings.farewell_phrase => {
                self.say_goodbye().await;
                self.transition(ConversationState::Ended);
                Flow::Exit
            }
            ConversationState::Conversing => {
                if let Err(e) = self.chat_turn(line).await {
                    if e.is_speech() {
                        warn!("Speech failed: {e}");
                    } else {
                        error!("Chat turn failed: {e}");
                    }
                    self.console.error(&e.to_string());
                }
                debug!("History: {} messages", self.history.len());
                Flow::Continue
            }
            ConversationState::Ended => Flow::Exit,
        }
    }

    async fn chat_turn(&mut self, line: String) -> Result<()> {
        self.history.push(Message::user(line));
        let reply = self.chat.complete(&self.history).await?;
        self.console.assistant(&reply.content);
        let content = reply.content.clone();
        self.history.push(reply);

        self.speak_reply(&content).await
    }

    /// Speak `text` whole, or chunk by chunk when it is over the engine's
    /// limit.
    async fn speak_reply(&self, text: &str) -> Result<()> {
        let count = grapheme_count(text);
        if count <= self.max_chunk_graphemes {
            return self.speaker.speak(text, &self.options).await;
        }

        let chunks = split_into_chunks(text, self.max_chunk_graphemes);
        info!("Reply is {count} graphemes, speaking {} chunks", chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Chunk {}/{}", i + 1, chunks.len());
            self.speaker.speak(chunk, &self.options).await?;
        }
        Ok(())
    }

    async fn say_goodbye(&self) {
        let farewell = &self.settings.farewell_reply;
        self.console.system(farewell);
        if let Err(e) = self.speaker.speak(farewell, &self.options).await {
            warn!("Farewell speech failed: {e}");
            self.console.error(&e.to_string());
        }
    }

    fn transition(&mut self, next: ConversationState) {
        if self.state != next {
            info!("State: {} → {next}", self.state);
            self.state = next;
        }
    }
}
