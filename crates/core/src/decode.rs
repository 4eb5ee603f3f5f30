//! Incremental decoding of event-stream bodies.
//!
//! Response bodies arrive in arbitrary byte chunks. A multi-byte character
//! or a whole `data: ` line may be split across two reads, so both the
//! UTF-8 decoder and the line splitter keep state between calls.

use crate::event::StreamEvent;

/// Streaming UTF-8 decoder.
///
/// Incomplete trailing sequences are held back until the next call.
/// Invalid bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk of bytes.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush held-back bytes at end of input.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

/// Decodes raw body chunks into stream events.
///
/// Lines are only parsed once their terminating newline has arrived; the
/// unterminated tail is parsed by [`EventDecoder::finish`]. Malformed
/// `data: ` lines are logged and skipped.
#[derive(Debug, Default)]
pub struct EventDecoder {
    utf8: Utf8Decoder,
    line: String,
    skipped: usize,
}

impl EventDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next body chunk, returning the events it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let text = self.utf8.decode(bytes);
        tracing::trace!("chunk: {text}");
        self.line.push_str(&text);

        let Some(end) = self.line.rfind('\n') else {
            return Vec::new();
        };
        let complete: String = self.line.drain(..=end).collect();
        let mut events = Vec::new();
        for line in complete[..end].split('\n') {
            self.parse(line, &mut events);
        }
        events
    }

    /// Parse whatever is left at end of body.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let tail = self.utf8.finish();
        self.line.push_str(&tail);

        let mut events = Vec::new();
        let line = std::mem::take(&mut self.line);
        if !line.is_empty() {
            self.parse(&line, &mut events);
        }
        events
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match StreamEvent::parse_line(line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => {
                self.skipped += 1;
                tracing::warn!("failed to parse event: {e}, data: {line}");
            }
        }
    }
}
