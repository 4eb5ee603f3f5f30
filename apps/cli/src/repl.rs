//! Interactive chat REPL with streaming output and persistent history.

use crate::config;
use anyhow::Result;
use client::{ChatSession, Outcome, SessionError, SessionObserver};
use rustyline::error::ReadlineError;
use std::{path::PathBuf, pin::pin};

/// Interactive chat REPL over a session.
pub struct ChatRepl<'a, O: SessionObserver> {
    session: &'a ChatSession<O>,
    editor: rustyline::DefaultEditor,
    history_path: PathBuf,
}

impl<'a, O: SessionObserver> ChatRepl<'a, O> {
    /// Create a new REPL sending through `session`.
    pub fn new(session: &'a ChatSession<O>) -> Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let history_path = config::config_dir().join("history");
        let _ = editor.load_history(&history_path);
        Ok(Self {
            session,
            editor,
            history_path,
        })
    }

    /// Run the interactive REPL loop.
    pub async fn run(&mut self) -> Result<()> {
        println!("Reefwatch assistant (Ctrl+D to exit, Ctrl+C to cancel a reply)");
        println!("---");

        loop {
            match self.editor.readline("> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if is_quit(line) {
                        break;
                    }
                    let _ = self.editor.add_history_entry(line);
                    let exchange = self.session.send_message(line);
                    if let Err(e) = interruptible(self.session, exchange).await {
                        // Already shown inline or as a notice.
                        tracing::debug!("exchange failed: {e}");
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        self.save_history();
        Ok(())
    }

    /// Save readline history to `~/.config/reefwatch/history`.
    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }
}

/// Whether a REPL line asks to leave.
pub fn is_quit(line: &str) -> bool {
    matches!(line, "/quit" | "/exit")
}

/// Drive an exchange to completion, cancelling it on Ctrl+C.
///
/// The exchange is polled first so it has claimed the session before the
/// signal can be observed.
pub async fn interruptible<O: SessionObserver>(
    session: &ChatSession<O>,
    exchange: impl Future<Output = Result<Outcome, SessionError>>,
) -> Result<Outcome, SessionError> {
    let canceller = session.canceller();
    let mut exchange = pin!(exchange);
    tokio::select! {
        biased;
        outcome = &mut exchange => outcome,
        _ = tokio::signal::ctrl_c() => {
            canceller.cancel();
            exchange.await
        }
    }
}
