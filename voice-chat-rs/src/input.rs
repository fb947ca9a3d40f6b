//! Line input from the terminal.
//!
//! Reads newline-delimited text on a dedicated thread and forwards each
//! line over a bounded channel to the conversation, which is its only
//! consumer. A plain thread keeps the runtime free to shut down while a
//! blocking read on stdin is still pending.

use std::io::BufRead;
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const LINE_QUEUE_CAPACITY: usize = 16;

pub struct LineReader<R> {
    reader: R,
    tx: mpsc::Sender<String>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, tx: mpsc::Sender<String>) -> Self {
        Self { reader, tx }
    }

    /// Forward lines until EOF, a read error, or the receiver going away.
    /// Blocks the calling thread.
    pub fn run(self) {
        for line in self.reader.lines() {
            match line {
                Ok(line) => {
                    if self.tx.blocking_send(line).is_err() {
                        debug!("Conversation finished, stop reading input");
                        return;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {e}");
                    return;
                }
            }
        }
        debug!("End of input");
    }
}

/// Start forwarding stdin lines to `tx` on a background thread.
pub fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || LineReader::new(std::io::stdin().lock(), tx).run())
}
