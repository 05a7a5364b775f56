use std::io::{IsTerminal, Write};

use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use crate::output::{colorize, Color};

/// The interactive line session. `question` is the module's only suspension
/// point; it never fails from the caller's perspective.
pub trait Session {
    /// Display the command prompt.
    fn prompt(&mut self);

    /// Display `text`, suspend for one line of input and return it trimmed.
    async fn question(&mut self, text: &str) -> String;

    /// Stage `text` as the editable default for the next `question`. Skipped
    /// when the terminal is non-interactive.
    fn write(&mut self, text: &str);

    /// End the session.
    fn close(&mut self);
}

/// Terminal session over tokio's async stdin.
pub struct TermSession {
    input: BufReader<Stdin>,
    pending: Option<String>,
    interactive: bool,
    closed: bool,
}

impl TermSession {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()),
            pending: None,
            interactive: std::io::stdout().is_terminal(),
            closed: false,
        }
    }

    /// The next command line, or `None` at end of input or after `close`.
    pub async fn next_line(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line).await {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    async fn read_reply(&mut self) -> String {
        let mut line = String::new();
        match self.input.read_line(&mut line).await {
            Ok(0) | Err(_) => String::new(),
            Ok(_) => line.trim().to_string(),
        }
    }
}

impl Default for TermSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Session for TermSession {
    fn prompt(&mut self) {
        print!("{} ", colorize("quiz >", Color::Cyan));
        let _ = std::io::stdout().flush();
    }

    async fn question(&mut self, text: &str) -> String {
        let staged = self.pending.take();
        match &staged {
            // The staged text is shown as an editable default; an empty
            // reply keeps it.
            Some(default) => print!("{} [{}] ", colorize(text, Color::Red), default),
            None => print!("{} ", colorize(text, Color::Red)),
        }
        let _ = std::io::stdout().flush();

        let reply = self.read_reply().await;
        if reply.is_empty() {
            staged.unwrap_or_default()
        } else {
            reply
        }
    }

    fn write(&mut self, text: &str) {
        if self.interactive {
            self.pending = Some(text.to_string());
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
