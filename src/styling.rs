//! Terminal output styling.
//!
//! Built on the anstyle ecosystem:
//! - anstream for auto-detecting color support (NO_COLOR, CLICOLOR_FORCE, tty)
//! - anstyle for composable style constants
//!
//! All git-wt messages go to stderr so that stdout stays reserved for the
//! shell bridge (the cd directive / target path). The finder subprocess
//! draws on the tty directly and is unaffected.

use anstyle::{AnsiColor, Color, Style};

pub use anstream::{eprint, eprintln, print, println, stderr, stdout};

/// Error style (red).
pub const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Warning style (yellow).
pub const WARNING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Hint style (dimmed).
pub const HINT: Style = Style::new().dimmed();

/// Success style (green).
pub const SUCCESS: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));

/// Branch name emphasis (cyan + bold).
pub const BRANCH: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));

pub const ERROR_SYMBOL: &str = "✗";
pub const HINT_SYMBOL: &str = "→";

/// Format an error line: red symbol, plain message.
pub fn error_message(message: impl std::fmt::Display) -> String {
    format!("{ERROR}{ERROR_SYMBOL}{ERROR:#} {message}")
}

/// Format a hint line: dimmed, prefixed with an arrow.
pub fn hint_message(message: impl std::fmt::Display) -> String {
    format!("{HINT}{HINT_SYMBOL} {message}{HINT:#}")
}

/// Format a success line: green symbol, plain message.
pub fn success_message(message: impl std::fmt::Display) -> String {
    format!("{SUCCESS}✓{SUCCESS:#} {message}")
}
