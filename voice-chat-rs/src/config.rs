//! Configuration management for voice-chat-rs.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults, so an absent file (or an absent key) is never fatal.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::narrator::NarratorTable;
use crate::text::DEFAULT_MAX_GRAPHEMES;

pub const DEFAULT_VOICEPEAK_PATH: &str = "/Applications/voicepeak.app/Contents/MacOS/voicepeak";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-3.5-turbo".into(),
            api_key_env: "OPENAI_API_KEY".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub executable: PathBuf,
    pub player: String,
    pub output_file: PathBuf,
    pub work_dir: PathBuf,
    pub narrator: Option<String>,
    pub max_chunk_graphemes: usize,
    pub narrators: BTreeMap<String, String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_VOICEPEAK_PATH),
            player: "afplay".into(),
            output_file: PathBuf::from("output.wav"),
            work_dir: PathBuf::from("."),
            narrator: Some("f1".into()),
            max_chunk_graphemes: DEFAULT_MAX_GRAPHEMES,
            narrators: NarratorTable::default().into_entries(),
        }
    }
}

impl SpeechConfig {
    pub fn narrator_table(&self) -> NarratorTable {
        NarratorTable::new(self.narrators.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub greeting: String,
    pub acknowledgment: String,
    pub farewell_phrase: String,
    pub farewell_reply: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            greeting: "どのようなチャットボットと会話をしたいですか？設定をまずは入力してください。"
                .into(),
            acknowledgment: "承知しました。それでは会話を始めましょう！".into(),
            farewell_phrase: "さようなら".into(),
            farewell_reply: "さようなら！またお話をしましょう！".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat: ChatConfig,
    pub speech: SpeechConfig,
    pub conversation: ConversationConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// An explicit `path` must exist and parse. Without one, the first
    /// existing file among these is used, and a broken file only warns:
    /// 1. ./config.yaml
    /// 2. ~/.config/voice-chat/config.yaml
    /// 3. /etc/voice-chat/config.yaml
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let config = Self::from_file(path)?;
            info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        let candidates = [
            std::env::current_dir().ok().map(|d| d.join("config.yaml")),
            dirs::home_dir().map(|h| h.join(".config/voice-chat/config.yaml")),
            Some(PathBuf::from("/etc/voice-chat/config.yaml")),
        ];
        let Some(config_path) = candidates.into_iter().flatten().find(|p| p.exists()) else {
            info!("No config file found, using defaults");
            return Ok(Self::default());
        };

        match Self::from_file(&config_path) {
            Ok(config) => {
                info!("Loaded config from {}", config_path.display());
                Ok(config)
            }
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_yaml(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }
}
