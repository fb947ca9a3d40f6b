//! External command execution.
//!
//! The speech pipeline only needs "run this program, did it succeed?", so
//! that is all [`CommandRunner`] exposes.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` inside `dir` and wait for it to exit.
    async fn run(&self, program: &Path, args: &[String], dir: &Path) -> Result<(), CommandError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &[String], dir: &Path) -> Result<(), CommandError> {
        let name = program.display().to_string();
        debug!("Running {name} with {} args in {}", args.len(), dir.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Exit {
                program: name,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
