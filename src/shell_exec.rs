//! External command execution with tracing.
//!
//! All subprocess invocations in git-wt (git and the fuzzy finder) go
//! through [`run`] so every external call gets a consistent `$ cmd` debug
//! line and a timing trace. Enable with `RUST_LOG=debug`.

use std::process::Command;

/// Execute a command, capturing output, with debug logging and timing.
///
/// ```text
/// $ git worktree list --porcelain
/// [wt-trace] cmd="git worktree list --porcelain" dur=8.2ms ok=true
/// ```
pub fn run(cmd: &mut Command) -> std::io::Result<std::process::Output> {
    use std::time::Instant;

    let cmd_str = render(cmd);
    log::debug!("$ {}", cmd_str);

    let t0 = Instant::now();
    let result = cmd.output();
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(output) => log::debug!(
            "[wt-trace] cmd=\"{}\" dur={:.1}ms ok={}",
            cmd_str,
            duration_ms,
            output.status.success()
        ),
        Err(e) => log::debug!(
            "[wt-trace] cmd=\"{}\" dur={:.1}ms err=\"{}\"",
            cmd_str,
            duration_ms,
            e
        ),
    }

    result
}

/// Render a command as the string a user would type, for logging.
/// Arguments with shell-significant characters are quoted.
pub fn render(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd
        .get_args()
        .map(|a| shell_escape::escape(a.to_string_lossy()).into_owned())
        .collect();
    if args.is_empty() {
        program.into_owned()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
