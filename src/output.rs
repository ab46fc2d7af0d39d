//! Session output and the shell bridge.
//!
//! A child process cannot change its parent shell's directory, so the
//! target path travels over stdout: in `--internal` mode (set by the
//! shell wrapper from `git-wt init`) it is prefixed with a directive the
//! wrapper intercepts and turns into `cd`; without the wrapper the bare
//! path is printed, which still composes with `cd "$(git-wt)"`.
//!
//! stdout carries only the directive or path. Everything addressed to the
//! human (completion messages, hints, errors) goes to stderr.

use crate::executor::{SessionResult, Status};
use crate::styling;

/// Marker the shell wrapper strips off the line that follows it with `cd`.
pub const CD_DIRECTIVE: &str = "__GIT_WT_CD__";

/// Print the session outcome.
pub fn emit(result: &SessionResult, internal: bool) {
    if let Some(message) = &result.message {
        styling::eprintln!("{message}");
    }
    let Some(path) = &result.target_path else {
        return;
    };
    if internal {
        styling::println!("{CD_DIRECTIVE}{}", path.display());
    } else {
        styling::println!("{}", path.display());
        styling::eprintln!(
            "{}",
            styling::hint_message(
                "shell integration is not active; run `git-wt init <shell>` for automatic cd"
            )
        );
    }
}

/// Process exit code for a finished session. Cancellation exits 0: the
/// user got what they asked for.
pub fn exit_code(status: Status) -> i32 {
    match status {
        Status::Success | Status::Cancelled => 0,
        Status::Failed => 1,
    }
}
