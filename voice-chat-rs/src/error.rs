//! Error types for voice-chat-rs.
//!
//! Every failure a turn can hit is one variant here. Errors carry the
//! underlying process or transport message as text so they can be printed
//! at the turn boundary without losing context.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Nothing to speak
    #[error("missing speech text")]
    MissingInput,

    /// The chat API credential is not set
    #[error("missing credential: environment variable {var} is not set")]
    CredentialMissing { var: String },

    /// The synthesis program did not answer its help probe
    #[error("command not found: {program}: {detail}")]
    ExecutableNotFound { program: PathBuf, detail: String },

    #[error("invalid narrator voice: {0}")]
    InvalidNarrator(String),

    #[error("synthesis command failed: {0}")]
    SynthesisFailed(String),

    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    /// The audio already played; only the file removal failed
    #[error("cleanup failed for {path}: {detail}")]
    CleanupFailed { path: PathBuf, detail: String },

    #[error("chat request failed: {0}")]
    Network(String),

    #[error("chat API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("malformed chat response: {0}")]
    MalformedResponse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came out of the speech pipeline rather than the
    /// chat API.
    pub fn is_speech(&self) -> bool {
        matches!(
            self,
            Error::MissingInput
                | Error::ExecutableNotFound { .. }
                | Error::InvalidNarrator(_)
                | Error::SynthesisFailed(_)
                | Error::PlaybackFailed(_)
                | Error::CleanupFailed { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
