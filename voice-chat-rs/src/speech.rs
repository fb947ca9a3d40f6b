//! VOICEPEAK speech: text → audio file → player → cleanup.
//!
//! Pipeline per call, strictly sequential:
//! 1. Validate text and narrator
//! 2. Probe the synthesis program with `--help`
//! 3. Synthesize into the work directory
//! 4. Play the file
//! 5. Delete the file

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::SpeechConfig;
use crate::error::{Error, Result};
use crate::narrator::NarratorTable;
use crate::runner::CommandRunner;

/// Per-call voice options, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechOptions {
    /// Key into the narrator table; `None` uses VOICEPEAK's own default.
    pub narrator: Option<String>,
    /// Synthesis program override.
    pub executable: Option<PathBuf>,
}

pub struct Speaker {
    executable: PathBuf,
    player: PathBuf,
    output_file: PathBuf,
    work_dir: PathBuf,
    narrators: NarratorTable,
    runner: Arc<dyn CommandRunner>,
}

impl Speaker {
    pub fn new(config: &SpeechConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            executable: config.executable.clone(),
            player: PathBuf::from(&config.player),
            output_file: config.output_file.clone(),
            work_dir: config.work_dir.clone(),
            narrators: config.narrator_table(),
            runner,
        }
    }

    /// Where the synthesized audio lands.
    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.output_file)
    }

    /// Synthesize `text`, play it, and remove the audio file.
    pub async fn speak(&self, text: &str, options: &SpeechOptions) -> Result<()> {
        if text.is_empty() {
            return Err(Error::MissingInput);
        }

        let executable = options.executable.as_deref().unwrap_or(self.executable.as_path());
        let narrator = options
            .narrator
            .as_deref()
            .map(|key| self.narrators.resolve(key))
            .transpose()?;

        self.runner
            .run(executable, &["--help".to_string()], &self.work_dir)
            .await
            .map_err(|e| Error::ExecutableNotFound {
                program: executable.to_path_buf(),
                detail: e.to_string(),
            })?;

        let t_gen = Instant::now();
        let args = synthesis_args(text, narrator, &self.output_file);
        self.runner
            .run(executable, &args, &self.work_dir)
            .await
            .map_err(|e| Error::SynthesisFailed(e.to_string()))?;
        let gen_ms = t_gen.elapsed().as_millis();

        let t_play = Instant::now();
        let file_arg = self.output_file.to_string_lossy().into_owned();
        self.runner
            .run(&self.player, &[file_arg], &self.work_dir)
            .await
            .map_err(|e| Error::PlaybackFailed(e.to_string()))?;
        let play_ms = t_play.elapsed().as_millis();

        remove_output(&self.output_path()).await?;

        info!(
            "Spoke {} chars (narrator: {}): gen={gen_ms}ms play={play_ms}ms",
            text.chars().count(),
            narrator.unwrap_or("default"),
        );
        Ok(())
    }
}

/// The audio lands at `output_file`, relative to the work directory.
fn synthesis_args(text: &str, narrator: Option<&str>, output_file: &Path) -> Vec<String> {
    let mut args = Vec::with_capacity(6);
    if let Some(name) = narrator {
        args.push("--narrator".to_string());
        args.push(name.to_string());
    }
    args.push("-o".to_string());
    args.push(output_file.to_string_lossy().into_owned());
    args.push("-s".to_string());
    args.push(text.to_string());
    args
}

async fn remove_output(path: &Path) -> Result<()> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|e| Error::CleanupFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    debug!("Removed {}", path.display());
    Ok(())
}
