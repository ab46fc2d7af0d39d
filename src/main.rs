use std::collections::HashSet;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use git_wt::executor::{Action, Executor, Status};
use git_wt::finder::{self, Finder, Selection};
use git_wt::git::{GitError, Repository};
use git_wt::menu::{CandidateKind, Menu};
use git_wt::registry::Registry;
use git_wt::shell::{Shell, init_script};
use git_wt::{output, styling};

#[derive(Parser)]
#[command(name = "git-wt")]
#[command(about = "Interactive git worktree manager", long_about = None)]
#[command(version)]
struct Cli {
    /// Run as if started in <PATH> instead of the current directory
    #[arg(short = 'C', value_name = "PATH", global = true)]
    directory: Option<PathBuf>,

    /// Emit shell-wrapper directives on stdout
    #[arg(long, hide = true, global = true)]
    internal: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a worktree to switch to, or create a new one (the default)
    Select,

    /// Pick one or more worktrees to remove
    Delete {
        /// Remove even with uncommitted changes
        #[arg(long)]
        force: bool,
    },

    /// Generate shell integration code
    Init {
        /// Shell to generate code for
        shell: Shell,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(Commands::Init { shell }) = &cli.command {
        styling::print!("{}", init_script(*shell));
        return;
    }

    let repo = match &cli.directory {
        Some(path) => Repository::at(path),
        None => Repository::current(),
    };

    let result = match cli.command {
        Some(Commands::Delete { force }) => delete_flow(&repo, cli.internal, force),
        Some(Commands::Select) | None => select_flow(&repo, cli.internal),
        Some(Commands::Init { .. }) => unreachable!("handled above"),
    };

    match result {
        Ok(status) => process::exit(output::exit_code(status)),
        Err(e) => {
            report(&e);
            process::exit(1);
        }
    }
}

/// The default flow: one finder round-trip, then switch to the chosen
/// worktree or create a new one from the trailing create entry.
fn select_flow(repo: &Repository, internal: bool) -> anyhow::Result<Status> {
    repo.ensure_repository()?;
    let finder = Finder::from_env()?;

    let registry = Registry::snapshot(repo)?;
    let menu = Menu::select(&registry, &dirty_paths(repo, &registry))?;

    let action = match finder.pick_one(&menu)? {
        Selection::Cancelled => Action::Cancel,
        Selection::Lines(lines) => resolve_single(&menu, &registry, &lines)?,
    };

    // The finder can stay open for a long time; validate against a fresh
    // snapshot so a selection that went stale meanwhile is caught instead
    // of handed to git.
    let fresh = match action {
        Action::Cancel => registry,
        _ => Registry::snapshot(repo)?,
    };
    let result = Executor::new(repo).run(&fresh, action)?;
    output::emit(&result, internal);
    Ok(result.status)
}

/// Map the finder's echoed line back to an action for the select flow.
fn resolve_single(menu: &Menu, registry: &Registry, lines: &[String]) -> anyhow::Result<Action> {
    // Single-select mode, so only the first line matters.
    let Some(line) = lines.first() else {
        return Ok(Action::Cancel);
    };
    let candidate = menu.parse_selection(line).ok_or_else(|| GitError::StaleSelection {
        detail: format!("finder returned an unknown entry: {line:?}"),
    })?;

    match candidate.kind {
        CandidateKind::ExistingWorktree => {
            let path = candidate.path.clone().ok_or_else(|| GitError::Other {
                message: "worktree entry has no path".into(),
            })?;
            Ok(Action::Switch { path })
        }
        CandidateKind::DeleteMarker => {
            unreachable!("delete entries are never rendered into the select menu")
        }
        CandidateKind::NewWorktreePrompt => {
            match finder::prompt_line("Branch name for the new worktree: ")? {
                Some(branch) => Ok(Action::Create {
                    branch,
                    base_ref: default_base(registry),
                }),
                // Empty name or EOF at the prompt backs out of the whole
                // session, same as cancelling in the finder.
                None => Ok(Action::Cancel),
            }
        }
    }
}

/// New branches are cut from the main worktree's branch, or HEAD when the
/// main worktree is detached.
fn default_base(registry: &Registry) -> String {
    registry
        .main()
        .branch
        .clone()
        .unwrap_or_else(|| "HEAD".to_string())
}

/// Multi-select removal. Each chosen worktree is validated and removed
/// independently; one failure does not stop the rest, but any failure
/// makes the session exit non-zero.
fn delete_flow(repo: &Repository, internal: bool, force: bool) -> anyhow::Result<Status> {
    repo.ensure_repository()?;
    let finder = Finder::from_env()?;

    let registry = Registry::snapshot(repo)?;
    let menu = Menu::delete(&registry, &dirty_paths(repo, &registry))?;

    let lines = match finder.pick_many(&menu)? {
        Selection::Cancelled => return Ok(Status::Cancelled),
        Selection::Lines(lines) => lines,
    };

    // Same staleness discipline as the select flow: re-snapshot once the
    // finder has returned, before any removal runs.
    let fresh = Registry::snapshot(repo)?;

    let mut status = Status::Success;
    for line in &lines {
        let outcome = delete_one(repo, &fresh, &menu, line, force, internal);
        if let Err(e) = outcome {
            report(&e);
            status = Status::Failed;
        }
    }
    Ok(status)
}

fn delete_one(
    repo: &Repository,
    registry: &Registry,
    menu: &Menu,
    line: &str,
    force: bool,
    internal: bool,
) -> anyhow::Result<()> {
    let candidate = menu.parse_selection(line).ok_or_else(|| GitError::StaleSelection {
        detail: format!("finder returned an unknown entry: {line:?}"),
    })?;
    let path = candidate.path.clone().ok_or_else(|| GitError::Other {
        message: "worktree entry has no path".into(),
    })?;

    let result = Executor::new(repo).run(registry, Action::Delete { path, force })?;
    output::emit(&result, internal);
    Ok(())
}

/// Paths of worktrees with uncommitted changes, for menu flags. A status
/// probe that fails (permissions, races) marks the tree as clean rather
/// than aborting the session.
fn dirty_paths(repo: &Repository, registry: &Registry) -> HashSet<PathBuf> {
    registry
        .iter()
        .filter(|wt| !wt.bare && wt.path.exists())
        .filter(|wt| !repo.is_clean(&wt.path).unwrap_or(true))
        .map(|wt| wt.path.clone())
        .collect()
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<GitError>() {
        // Domain errors carry their own styled message and hint.
        Some(git_err) => styling::eprintln!("{git_err}"),
        None => styling::eprintln!("{}", styling::error_message(err)),
    }
}
