//! Assistant chat commands.

use crate::{
    cmd::predict::{FormArgs, print_assessment},
    config::Config,
    repl::{ChatRepl, interruptible},
    terminal::TerminalView,
};
use anyhow::{Context, Result};
use clap::Args;
use client::{ChatSession, Outcome, SessionObserver};
use reef::InitContext;
use std::path::{Path, PathBuf};

/// Chat with the assistant.
#[derive(Args, Debug)]
pub struct Chat {
    /// Send one message and exit instead of starting the REPL.
    pub message: Option<String>,

    /// Write the rendered transcript as HTML on exit.
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

impl Chat {
    /// Send the one-shot message or enter the REPL.
    pub async fn run(self, config: &Config) -> Result<()> {
        let session = ChatSession::new(config.client()?, TerminalView::new());
        let result = match self.message {
            Some(message) => send_once(&session, &message).await,
            None => ChatRepl::new(&session)?.run().await,
        };
        save_transcript(&session, self.transcript.as_deref())?;
        result
    }
}

/// Predict, then open a conversation about the assessment.
#[derive(Args, Debug)]
pub struct Analyze {
    /// The prediction form.
    #[command(flatten)]
    pub form: FormArgs,

    /// Write the rendered transcript as HTML on exit.
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

impl Analyze {
    /// Print the assessment, stream the assistant's greeting, then enter
    /// the REPL.
    pub async fn run(self, config: &Config) -> Result<()> {
        let request = self.form.to_request(&config.predict)?;
        let client = config.client()?;
        let assessment = client
            .predict(&request)
            .await
            .context("prediction failed")?;
        print_assessment(&assessment);
        println!();

        let session = ChatSession::new(client, TerminalView::new());
        let context = InitContext::new(request.readings, &assessment);
        if let Err(e) = interruptible(&session, session.init_session(&context)).await {
            // The notice is in the transcript; the chat stays usable.
            tracing::warn!("greeting failed: {e}");
        }

        let result = ChatRepl::new(&session)?.run().await;
        save_transcript(&session, self.transcript.as_deref())?;
        result
    }
}

async fn send_once<O: SessionObserver>(session: &ChatSession<O>, message: &str) -> Result<()> {
    match interruptible(session, session.send_message(message))
        .await
        .context("chat failed")?
    {
        Outcome::Ignored => anyhow::bail!("message is empty"),
        _ => Ok(()),
    }
}

fn save_transcript<O: SessionObserver>(
    session: &ChatSession<O>,
    path: Option<&Path>,
) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    std::fs::write(path, session.transcript().to_html())
        .with_context(|| format!("writing transcript to {}", path.display()))
}
