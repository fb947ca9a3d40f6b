//! Test doubles for the process, chat and console seams.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::chat::ChatBackend;
use crate::console::Console;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::runner::{CommandError, CommandRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Probe,
    Synthesize,
    Play,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Call {
    /// The `-o` argument of a synthesis call.
    fn output_file(&self) -> Option<&str> {
        let at = self.args.iter().position(|a| a == "-o")?;
        self.args.get(at + 1).map(String::as_str)
    }

    fn step(&self) -> Step {
        if self.args == ["--help"] {
            Step::Probe
        } else if self.args.iter().any(|a| a == "-s") {
            Step::Synthesize
        } else {
            Step::Play
        }
    }
}

/// Records every command and fakes VOICEPEAK by creating the `-o` file
/// (`output.wav` when absent).
pub struct FakeRunner {
    calls: Mutex<Vec<Call>>,
    fail: Option<Step>,
    write_output: bool,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: None,
            write_output: true,
        }
    }

    pub fn failing(mut self, step: Step) -> Self {
        self.fail = Some(step);
        self
    }

    /// Synthesis "succeeds" without producing a file.
    pub fn without_output(mut self) -> Self {
        self.write_output = false;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The text of every synthesis call, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.step() == Step::Synthesize)
            .filter_map(|c| c.args.last().cloned())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        dir: &Path,
    ) -> std::result::Result<(), CommandError> {
        let call = Call {
            program: program.to_path_buf(),
            args: args.to_vec(),
            dir: dir.to_path_buf(),
        };
        let step = call.step();
        let output = dir.join(call.output_file().unwrap_or("output.wav"));
        self.calls.lock().unwrap().push(call);

        if self.fail == Some(step) {
            return Err(CommandError::Exit {
                program: program.display().to_string(),
                status: "exit status: 1".into(),
                stderr: format!("fake {step:?} failure").to_lowercase(),
            });
        }
        if step == Step::Synthesize && self.write_output {
            std::fs::write(output, b"RIFF").unwrap();
        }
        Ok(())
    }
}

/// Replays canned replies and records the history it was given.
pub struct FakeChat {
    replies: Mutex<VecDeque<Result<Message>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl FakeChat {
    pub fn new(replies: impl IntoIterator<Item = Result<Message>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A backend that must never be asked for anything.
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeChat {
    async fn complete(&self, history: &[Message]) -> Result<Message> {
        self.seen.lock().unwrap().push(history.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Network("no canned reply left".into())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    System(String),
    Assistant(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<Line>>,
}

impl RecordingConsole {
    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().unwrap().clone()
    }
}

impl Console for RecordingConsole {
    fn system(&self, text: &str) {
        self.lines.lock().unwrap().push(Line::System(text.to_string()));
    }

    fn assistant(&self, text: &str) {
        self.lines.lock().unwrap().push(Line::Assistant(text.to_string()));
    }

    fn error(&self, text: &str) {
        self.lines.lock().unwrap().push(Line::Error(text.to_string()));
    }
}
