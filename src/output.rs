use std::io::IsTerminal;
use std::sync::OnceLock;

/// Colors the interface actually uses; cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Magenta,
    Cyan,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Red => "31",
            Color::Green => "32",
            Color::Magenta => "35",
            Color::Cyan => "36",
        }
    }
}

fn stdout_is_terminal() -> bool {
    static INTERACTIVE: OnceLock<bool> = OnceLock::new();
    *INTERACTIVE.get_or_init(|| std::io::stdout().is_terminal())
}

/// Wraps `text` in ANSI color codes, or returns it untouched when stdout is
/// not a terminal.
pub fn colorize(text: &str, color: Color) -> String {
    if stdout_is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", color.code(), text)
    } else {
        text.to_string()
    }
}

/// The console collaborator: normal output, error output and banner output.
pub trait Console {
    fn log(&self, text: &str);

    fn errorlog(&self, text: &str);

    fn biglog(&self, text: &str, color: Color);
}

/// Writes to the real terminal; errors go to stderr so they stay distinct
/// from normal output even when piped.
pub struct Term;

impl Console for Term {
    fn log(&self, text: &str) {
        println!("{text}");
    }

    fn errorlog(&self, text: &str) {
        eprintln!("{}", colorize(text, Color::Red));
    }

    fn biglog(&self, text: &str, color: Color) {
        for line in banner(text) {
            println!("{}", colorize(&line, color));
        }
    }
}

/// Renders `text` as an oversized boxed banner.
fn banner(text: &str) -> Vec<String> {
    let spaced: String = text
        .to_uppercase()
        .chars()
        .map(|c| format!(" {c}"))
        .collect();
    let inner = format!(" {spaced}  ");
    let width = inner.chars().count();
    let bar: String = "═".repeat(width);
    vec![
        format!("╔{bar}╗"),
        format!("║{inner}║"),
        format!("╚{bar}╝"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_boxes_the_uppercased_text() {
        let lines = banner("ok");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("O K"));

        let width = lines[1].chars().count();
        assert_eq!(lines[0].chars().count(), width);
        assert_eq!(lines[2].chars().count(), width);
    }
}
