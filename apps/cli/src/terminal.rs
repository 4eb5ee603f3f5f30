//! Terminal rendering of a chat session.
//!
//! On a terminal the unfinished last line of the streaming reply is redrawn
//! in place from the accumulated text on every update, so `**bold**` split
//! across fragments still renders. Bold never spans a newline, so finished
//! lines are left alone. Piped output gets plain appended text instead.

use client::SessionObserver;
use console::{Term, measure_text_width, style};
use crossterm::{
    cursor::{MoveToColumn, MoveToPreviousLine},
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use parking_lot::Mutex;
use reef::{ChatMessage, MessageId, Role, markdown};
use std::io::Write;

/// Size assumed when the terminal size is unknown.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// One terminal operation produced by [`ReplyPainter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    /// Leave the current line; the reply continues below.
    Newline,
    /// Print text after the cursor.
    Append(String),
    /// Move up `up` rows to the start of the unfinished tail, clear to the
    /// end of the screen and print `text`.
    Redraw { up: usize, text: String },
}

/// Tracks what of a streaming reply is on screen and plans each update.
///
/// Only the text after the last newline is redrawn. Once that tail is as
/// tall as the screen its first row may have scrolled away, so it is
/// appended to until its line ends.
#[derive(Debug, Default)]
pub struct ReplyPainter {
    /// Content drawn so far.
    shown: String,
    /// Byte offset where the unfinished tail starts.
    committed: usize,
    /// Screen rows the tail occupies.
    rows: usize,
}

impl ReplyPainter {
    /// Plan the operations that bring the screen to `content`.
    pub fn update(
        &mut self,
        content: &str,
        plain: bool,
        width: usize,
        height: usize,
    ) -> Vec<Paint> {
        let height = height.max(1);
        let mut paints = Vec::new();

        if !content.starts_with(self.shown.as_str()) {
            let rows = self.rows;
            let in_place = self.committed == 0 && rows < height;
            *self = Self::default();
            if in_place {
                self.rows = rows;
            } else {
                paints.push(Paint::Newline);
            }
        }

        if self.rows >= height {
            let fresh = &content[self.shown.len()..];
            let Some(end) = fresh.find('\n') else {
                paints.push(Paint::Append(fresh.to_owned()));
                self.shown = content.to_owned();
                self.rows = rows(&content[self.committed..], width);
                return paints;
            };
            paints.push(Paint::Append(fresh[..=end].to_owned()));
            self.committed = self.shown.len() + end + 1;
            self.shown = content[..self.committed].to_owned();
            self.rows = 0;
        }

        let tail = &content[self.committed..];
        paints.push(Paint::Redraw {
            up: self.rows.saturating_sub(1),
            text: render(tail, plain),
        });
        if let Some(end) = tail.rfind('\n') {
            self.committed += end + 1;
        }
        self.rows = rows(&render(&content[self.committed..], plain), width);
        self.shown = content.to_owned();
        paints
    }

    /// Whether nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.rows == 0
    }
}

fn render(text: &str, plain: bool) -> String {
    if plain {
        text.to_owned()
    } else {
        markdown::to_ansi(text)
    }
}

/// Prints session effects to stdout.
pub struct TerminalView {
    tty: bool,
    state: Mutex<ViewState>,
}

#[derive(Default)]
struct ViewState {
    /// Reply currently being drawn.
    reply: Option<MessageId>,
    /// Screen state of the reply on a terminal.
    painter: ReplyPainter,
    /// Plain text already written when not on a terminal.
    written: String,
}

impl TerminalView {
    /// Detect whether stdout is a terminal.
    pub fn new() -> Self {
        Self::with_tty(Term::stdout().is_term())
    }

    /// Force redraw (`true`) or plain append (`false`) mode.
    pub fn with_tty(tty: bool) -> Self {
        Self {
            tty,
            state: Mutex::new(ViewState::default()),
        }
    }

    fn paint(&self, state: &mut ViewState, message: &ChatMessage) {
        let (width, height) = terminal::size().unwrap_or(FALLBACK_SIZE);
        let paints = state.painter.update(
            &message.content,
            message.plain,
            usize::from(width),
            usize::from(height),
        );

        let mut stdout = std::io::stdout();
        for paint in paints {
            let _ = match paint {
                Paint::Newline => queue!(stdout, Print("\r\n")),
                Paint::Append(text) => queue!(stdout, Print(text.replace('\n', "\r\n"))),
                Paint::Redraw { up, text } => {
                    let _ = queue!(stdout, MoveToColumn(0));
                    if up > 0 {
                        let up = u16::try_from(up).unwrap_or(u16::MAX);
                        let _ = queue!(stdout, MoveToPreviousLine(up));
                    }
                    queue!(
                        stdout,
                        Clear(ClearType::FromCursorDown),
                        Print(text.replace('\n', "\r\n"))
                    )
                }
            };
        }
        stdout.flush().ok();
    }

    fn append_plain(&self, state: &mut ViewState, content: &str) {
        let delta = match content.strip_prefix(state.written.as_str()) {
            Some(delta) => delta.to_owned(),
            // Replaced rather than extended, e.g. by an error event.
            None => format!("\n{content}"),
        };
        print!("{delta}");
        std::io::stdout().flush().ok();
        state.written = content.to_owned();
    }

    fn message_update(&self, state: &mut ViewState, message: &ChatMessage) {
        if self.tty {
            self.paint(state, message);
        } else {
            self.append_plain(state, &message.content);
        }
    }

    fn end_reply(state: &mut ViewState) {
        if !state.painter.is_empty() || !state.written.is_empty() {
            println!();
        }
        *state = ViewState::default();
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for TerminalView {
    fn busy_changed(&self, busy: bool) {
        if !busy {
            Self::end_reply(&mut self.state.lock());
        }
    }

    fn message_appended(&self, message: &ChatMessage) {
        let mut state = self.state.lock();
        match message.role {
            Role::User => {}
            Role::Assistant => {
                Self::end_reply(&mut state);
                state.reply = Some(message.id);
                if !message.content.is_empty() {
                    self.message_update(&mut state, message);
                }
            }
            Role::Notice => {
                Self::end_reply(&mut state);
                println!("{}", style(&message.content).dim());
            }
        }
    }

    fn message_updated(&self, message: &ChatMessage) {
        let mut state = self.state.lock();
        if state.reply == Some(message.id) {
            self.message_update(&mut state, message);
        }
    }
}

/// Screen rows `text` occupies at the given width, counting wrapped lines.
/// ANSI escapes take no width.
pub fn rows(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.split('\n')
        .map(|line| measure_text_width(line).div_ceil(width).max(1))
        .sum()
}
