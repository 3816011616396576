// src/view.rs

/// The rendering surface a session writes to.
///
/// Implementations own presentation only; the session decides what to show.
pub trait ChatView {
    /// Appends raw HTML to the transcript. The transcript is never trimmed.
    fn append_transcript(&mut self, html: &str);

    /// Replaces every roster entry with `users`, in the given order.
    fn replace_roster(&mut self, users: &[String]);

    /// Shows a blocking notice to the user.
    fn alert(&mut self, message: &str);
}

/// A view that keeps everything in memory. Useful for headless runs and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryView {
    pub transcript: String,
    pub roster: Vec<String>,
    pub alerts: Vec<String>,
}

impl ChatView for MemoryView {
    fn append_transcript(&mut self, html: &str) {
        self.transcript.push_str(html);
    }

    fn replace_roster(&mut self, users: &[String]) {
        self.roster.clear();
        self.roster.extend(users.iter().cloned());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
