//! Fuzzy-finder subprocess driver.
//!
//! The finder is treated as a line-oriented filter: candidate labels go in
//! on its stdin, one per line, and the chosen line(s) come back verbatim on
//! its stdout. The finder draws its UI on the controlling terminal, so
//! both pipes stay free for the protocol.
//!
//! This is the single suspension point of the whole tool: the process
//! blocks on the finder with no timeout, since a human is on the other
//! end. A cancel-indicating exit status (fzf uses 1 for "no match" and 130
//! for interrupt/escape) is not an error: both mean the user backed out,
//! and the protocol cannot tell those apart, so both map to
//! [`Selection::Cancelled`].

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::git::GitError;
use crate::menu::Menu;
use crate::shell_exec;

/// Default finder binary. Override with `GIT_WT_FINDER` (whitespace-split
/// into program and leading arguments).
const DEFAULT_FINDER: &str = "fzf";

/// Exit statuses that signal "user backed out" rather than failure.
const CANCEL_EXIT_CODES: &[i32] = &[1, 130];

/// Outcome of one finder round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The chosen line(s), exactly as fed in.
    Lines(Vec<String>),
    /// User cancelled; a first-class successful-but-inactive outcome.
    Cancelled,
}

/// Handle on the configured fuzzy-finder command.
#[derive(Debug)]
pub struct Finder {
    program: String,
    args: Vec<String>,
}

impl Finder {
    /// Resolve the finder from the environment, verifying it exists up
    /// front so a missing binary is reported before the menu is built.
    pub fn from_env() -> anyhow::Result<Self> {
        let spec = std::env::var("GIT_WT_FINDER").unwrap_or_else(|_| DEFAULT_FINDER.to_string());
        let mut words = spec.split_whitespace().map(String::from);
        let program = words.next().unwrap_or_else(|| DEFAULT_FINDER.to_string());
        let args: Vec<String> = words.collect();

        if which::which(&program).is_err() {
            return Err(GitError::FinderUnavailable {
                finder: program,
                detail: "not found in PATH".into(),
            }
            .into());
        }

        Ok(Self { program, args })
    }

    /// Construct with an explicit command, bypassing PATH lookup.
    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Present the menu and obtain exactly one choice.
    pub fn pick_one(&self, menu: &Menu) -> anyhow::Result<Selection> {
        self.run(menu, false)
    }

    /// Present the menu and obtain a set of choices (delete flow).
    pub fn pick_many(&self, menu: &Menu) -> anyhow::Result<Selection> {
        self.run(menu, true)
    }

    fn run(&self, menu: &Menu, multi: bool) -> anyhow::Result<Selection> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if multi && self.is_fzf() {
            cmd.arg("--multi");
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        log::debug!("$ {}", shell_exec::render(&cmd));

        let mut child = cmd.spawn().map_err(|e| GitError::FinderUnavailable {
            finder: self.program.clone(),
            detail: e.to_string(),
        })?;

        // Feed candidates. A broken pipe just means the user made (or
        // abandoned) a choice before reading everything; the exit status
        // decides what happened.
        {
            let mut stdin = child.stdin.take().context("finder stdin unavailable")?;
            for label in menu.labels() {
                if let Err(e) = writeln!(stdin, "{label}") {
                    if e.kind() == std::io::ErrorKind::BrokenPipe {
                        break;
                    }
                    return Err(e).context("Failed to write candidates to finder");
                }
            }
            // Dropping stdin closes the pipe so the finder sees EOF.
        }

        // wait_with_output reaps the child and closes both pipes on every
        // path, so no orphaned subprocess or hung pipe survives an error.
        let output = child
            .wait_with_output()
            .context("Failed to wait for finder")?;

        if !output.status.success() {
            let code = output.status.code();
            return if code.is_some_and(|c| CANCEL_EXIT_CODES.contains(&c)) {
                Ok(Selection::Cancelled)
            } else {
                Err(GitError::FinderUnavailable {
                    finder: self.program.clone(),
                    detail: match code {
                        Some(c) => format!("exited with status {c}"),
                        None => "terminated by signal".into(),
                    },
                }
                .into())
            };
        }

        let lines: Vec<String> = output
            .stdout
            .lines()
            .collect::<Result<_, _>>()
            .context("Finder produced non-UTF-8 output")?;
        let lines: Vec<String> = lines.into_iter().filter(|l| !l.is_empty()).collect();

        if lines.is_empty() {
            Ok(Selection::Cancelled)
        } else {
            Ok(Selection::Lines(lines))
        }
    }

    fn is_fzf(&self) -> bool {
        std::path::Path::new(&self.program)
            .file_stem()
            .is_some_and(|s| s == "fzf")
    }
}

/// Prompt for a single line on the terminal (used for the new branch name
/// after the create entry is chosen). Returns `None` on empty input or EOF,
/// which callers treat as cancellation.
pub fn prompt_line(prompt: &str) -> anyhow::Result<Option<String>> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    crate::styling::eprint!("{prompt}");
    std::io::stderr().flush().ok();

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read branch name")?;
    let trimmed = line.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
