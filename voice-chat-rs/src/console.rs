//! Conversation output on the terminal.

use std::io::Write;

const GREEN: &str = "\u{1b}[32m";
const CYAN: &str = "\u{1b}[36m";
const RED: &str = "\u{1b}[31m";
const RESET: &str = "\u{1b}[0m";

pub trait Console: Send + Sync {
    /// Prompts and acknowledgments from the program itself.
    fn system(&self, text: &str);
    fn assistant(&self, text: &str);
    fn error(&self, text: &str);
}

/// Colored stdout/stderr output.
pub struct TerminalConsole {
    color: bool,
}

impl TerminalConsole {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Console for TerminalConsole {
    fn system(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", self.paint(GREEN, text));
    }

    fn assistant(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", self.paint(CYAN, text));
    }

    fn error(&self, text: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", self.paint(RED, text));
    }
}
