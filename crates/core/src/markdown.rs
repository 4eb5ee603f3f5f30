//! Rendering of the assistant's lightweight markup.
//!
//! The assistant only emits two constructs worth rendering: `**bold**`
//! spans and line breaks. A bold span opens and closes on the same line and
//! closes at the first following `**`; an unmatched `**` is kept as text.
//!
//! Renderers always work on the complete text. Streaming callers must
//! re-render the full accumulated buffer after every chunk, since a span may
//! open in one chunk and close in a later one.

/// A piece of tokenized markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    /// Plain text.
    Text(&'a str),
    /// Text between a pair of `**` markers.
    Bold(&'a str),
    /// A literal newline.
    Break,
}

/// Tokenize `text` into spans.
pub fn spans(text: &str) -> Vec<Span<'_>> {
    let mut out = Vec::new();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push(Span::Break);
        }
        line_spans(line, &mut out);
    }
    out
}

fn line_spans<'a>(line: &'a str, out: &mut Vec<Span<'a>>) {
    let mut start = 0;
    while let Some(offset) = line[start..].find("**") {
        let open = start + offset;
        let body = open + 2;
        // No closer after the first opener means no later opener on this
        // line can be closed either.
        let Some(len) = line[body..].find("**") else {
            break;
        };
        if open > start {
            out.push(Span::Text(&line[start..open]));
        }
        out.push(Span::Bold(&line[body..body + len]));
        start = body + len + 2;
    }
    if start < line.len() {
        out.push(Span::Text(&line[start..]));
    }
}

/// Render markup as HTML: `<strong>` for bold spans, `<br>` for newlines.
///
/// Text is HTML-escaped before it is wrapped.
pub fn to_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    for span in spans(text) {
        match span {
            Span::Text(t) => escape_into(t, &mut html),
            Span::Bold(t) => {
                html.push_str("<strong>");
                escape_into(t, &mut html);
                html.push_str("</strong>");
            }
            Span::Break => html.push_str("<br>"),
        }
    }
    html
}

/// Render markup for a terminal, using ANSI bold for bold spans.
pub fn to_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for span in spans(text) {
        match span {
            Span::Text(t) => out.push_str(t),
            Span::Bold(t) => out.push_str(&console::style(t).bold().to_string()),
            Span::Break => out.push('\n'),
        }
    }
    out
}

/// HTML-escape `text` without interpreting any markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, &mut out);
    out
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
