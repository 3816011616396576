// src/terminal.rs

use crate::{client::UserIntent, state::SubmitTrigger, view::ChatView};
use std::io::{self, BufRead, Write};
use tokio::sync::mpsc::UnboundedSender;

/// Renders the chat to line-oriented writers: the transcript and roster go to
/// `out` (usually stdout), alerts go to `err` (usually stderr).
pub struct TerminalView<W: Write, E: Write> {
    out: W,
    err: E,
    // Raw HTML as received; only ever appended to.
    transcript: String,
}

impl<W: Write, E: Write> TerminalView<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            out,
            err,
            transcript: String::new(),
        }
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.err.flush()
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

fn write_line(writer: &mut impl Write, text: &str) {
    if let Err(e) = writer.write_all(text.as_bytes()).and_then(|()| writer.flush()) {
        log::warn!("Failed to write to terminal: {}", e);
    }
}

impl<W: Write, E: Write> ChatView for TerminalView<W, E> {
    fn append_transcript(&mut self, html: &str) {
        self.transcript.push_str(html);
        write_line(&mut self.out, &html_to_text(html));
    }

    fn replace_roster(&mut self, users: &[String]) {
        write_line(&mut self.out, &format!("-- online: {}\n", users.join(", ")));
    }

    fn alert(&mut self, message: &str) {
        write_line(&mut self.err, &format!("! {}\n", message));
    }
}

/// Turns the server's inline HTML into plain text: `<br>` becomes a newline,
/// every other tag is dropped and the common entities are decoded.
///
/// A `<` only opens a tag when followed by a letter or `/`; a tag left open
/// at the end of the chunk is kept as text.
pub fn html_to_text(html: &str) -> String {
    let html = html.replace("<br>", "\n");
    let mut text = String::with_capacity(html.len());
    // Characters of a tag that has not been closed yet.
    let mut tag = String::new();
    let mut in_tag = false;
    let mut chars = html.chars().peekable();
    while let Some(c) = chars.next() {
        if in_tag {
            if c == '>' {
                in_tag = false;
                tag.clear();
            } else {
                tag.push(c);
            }
        } else if c == '<'
            && chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphabetic() || *next == '/')
        {
            in_tag = true;
            tag.push(c);
        } else {
            text.push(c);
        }
    }
    text.push_str(&tag);
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Maps one line of terminal input to intents.
///
/// `/to <name>` sets the receiver, `/draft <text>` sets the message without
/// sending, `/send` clicks send and `/quit` leaves. Anything else is typed
/// into the message field and submitted with Enter.
pub fn parse_line(line: &str) -> Vec<UserIntent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(name) = line.strip_prefix("/to ") {
        return vec![UserIntent::SetReceiver(name.trim().to_string())];
    }
    if let Some(text) = line.strip_prefix("/draft ") {
        return vec![UserIntent::SetMessage(text.to_string())];
    }
    match line {
        "/send" => vec![UserIntent::Submit(SubmitTrigger::SendButton)],
        "/quit" => vec![UserIntent::Unload],
        _ => vec![
            UserIntent::SetMessage(line.to_string()),
            UserIntent::Submit(SubmitTrigger::EnterKey),
        ],
    }
}

/// Reads stdin on its own thread and forwards parsed intents.
/// End of input becomes an unload.
pub fn forward_stdin(tx: UnboundedSender<UserIntent>) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            };
            for intent in parse_line(&line) {
                if tx.send(intent).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(UserIntent::Unload);
    });
}
