//! Typed domain errors.
//!
//! `GitError` is a pattern-matchable enum for every failure class the tool
//! can surface. Use `.into()` to convert to `anyhow::Error` while keeping
//! the type available for `downcast_ref`. Display produces the styled,
//! user-facing message (with a dimmed hint line where one helps).

use std::path::PathBuf;

use color_print::cformat;

use crate::styling::{error_message, hint_message};

/// Domain errors for git, finder, and selection handling.
///
/// Each variant stores the data needed to construct a user-facing message.
/// None of these is retried internally: every one represents a decision
/// point only the user can resolve.
#[derive(Debug, Clone)]
pub enum GitError {
    /// The `git` binary itself could not be run.
    VcsUnavailable {
        detail: String,
    },
    /// Not inside a git-managed tree.
    NotARepository,

    // Create failures
    BranchAlreadyExists {
        branch: String,
    },
    RefNotFound {
        reference: String,
    },
    WorktreePathOccupied {
        path: PathBuf,
    },

    // Remove failures
    UncommittedChanges {
        path: PathBuf,
        branch: Option<String>,
    },
    WorktreeLocked {
        path: PathBuf,
        reason: Option<String>,
    },
    PathNotFound {
        path: PathBuf,
    },
    CannotRemoveMainWorktree {
        path: PathBuf,
    },

    // Selection failures
    /// Live state diverged from the snapshot the menu was built from.
    StaleSelection {
        detail: String,
    },
    /// The fuzzy finder is missing or exited abnormally.
    FinderUnavailable {
        finder: String,
        detail: String,
    },
    /// A branch name or path contains the label delimiter.
    FormatCollision {
        name: String,
    },

    ParseError {
        message: String,
    },
    /// Unrecognized git failure, raw message preserved verbatim.
    Other {
        message: String,
    },
}

impl std::error::Error for GitError {}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::VcsUnavailable { detail } => {
                write!(
                    f,
                    "{}\n{}",
                    error_message(format!("Cannot run git: {detail}")),
                    hint_message("Install git or make sure it is on PATH")
                )
            }

            GitError::NotARepository => {
                write!(
                    f,
                    "{}\n{}",
                    error_message("Not inside a git repository"),
                    hint_message("Run git-wt from within a repository or use -C <path>")
                )
            }

            GitError::BranchAlreadyExists { branch } => {
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Branch <bold>{branch}</> already exists")),
                    hint_message("Pick a different name, or select its worktree instead")
                )
            }

            GitError::RefNotFound { reference } => {
                write!(
                    f,
                    "{}",
                    error_message(cformat!("Reference <bold>{reference}</> not found"))
                )
            }

            GitError::WorktreePathOccupied { path } => {
                write!(
                    f,
                    "{}",
                    error_message(format!("Path already occupied: {}", path.display()))
                )
            }

            GitError::UncommittedChanges { path, branch } => {
                let message = match branch {
                    Some(b) => cformat!("<bold>{b}</> has uncommitted changes"),
                    None => format!("{} has uncommitted changes", path.display()),
                };
                write!(
                    f,
                    "{}\n{}",
                    error_message(message),
                    hint_message(cformat!(
                        "Commit or stash them, or re-run with <bright-black>--force</> to discard"
                    ))
                )
            }

            GitError::WorktreeLocked { path, reason } => {
                let message = match reason {
                    Some(r) if !r.is_empty() => {
                        format!("Worktree {} is locked: {}", path.display(), r)
                    }
                    _ => format!("Worktree {} is locked", path.display()),
                };
                write!(
                    f,
                    "{}\n{}",
                    error_message(message),
                    hint_message(cformat!(
                        "Unlock it first: <bright-black>git worktree unlock <<path>></>"
                    ))
                )
            }

            GitError::PathNotFound { path } => {
                write!(
                    f,
                    "{}",
                    error_message(format!("No worktree at {}", path.display()))
                )
            }

            GitError::CannotRemoveMainWorktree { path } => {
                write!(
                    f,
                    "{}",
                    error_message(format!(
                        "Cannot remove the main worktree at {}",
                        path.display()
                    ))
                )
            }

            GitError::StaleSelection { detail } => {
                write!(
                    f,
                    "{}\n{}",
                    error_message(format!("Selection is stale: {detail}")),
                    hint_message("The worktree list changed since the menu was built; re-run git-wt")
                )
            }

            GitError::FinderUnavailable { finder, detail } => {
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Fuzzy finder <bold>{finder}</> unavailable: {detail}")),
                    hint_message(cformat!(
                        "Install fzf or point <bright-black>GIT_WT_FINDER</> at another line filter"
                    ))
                )
            }

            GitError::FormatCollision { name } => {
                write!(
                    f,
                    "{}",
                    error_message(format!(
                        "Cannot render menu entry: {name:?} contains the reserved tab delimiter"
                    ))
                )
            }

            GitError::ParseError { message } => {
                write!(f, "{}", error_message(format!("Parse error: {message}")))
            }

            GitError::Other { message } => write!(f, "{}", error_message(message)),
        }
    }
}

impl GitError {
    /// Classify a failed git invocation by recognizable stderr substrings.
    ///
    /// `path` and `branch` give the classified variants their context; they
    /// describe the operation that was attempted, not the stderr content.
    /// Unrecognized failures become [`GitError::Other`] with the raw message.
    pub(crate) fn classify(stderr: &str, path: Option<&PathBuf>, branch: Option<&str>) -> Self {
        let raw = stderr.trim();
        let lower = raw.to_lowercase();

        if lower.contains("not a git repository") {
            GitError::NotARepository
        } else if lower.contains("a branch named") && lower.contains("already exists") {
            GitError::BranchAlreadyExists {
                branch: branch.unwrap_or_default().to_string(),
            }
        } else if lower.contains("already checked out") || lower.contains("already used by worktree")
        {
            GitError::BranchAlreadyExists {
                branch: branch.unwrap_or_default().to_string(),
            }
        } else if lower.contains("already exists") {
            GitError::WorktreePathOccupied {
                path: path.cloned().unwrap_or_default(),
            }
        } else if lower.contains("invalid reference")
            || lower.contains("not a valid ref")
            || lower.contains("unknown revision")
        {
            GitError::RefNotFound {
                reference: branch.unwrap_or_default().to_string(),
            }
        } else if lower.contains("contains modified or untracked files") {
            GitError::UncommittedChanges {
                path: path.cloned().unwrap_or_default(),
                branch: branch.map(String::from),
            }
        } else if lower.contains("locked working tree") || lower.contains("is locked") {
            GitError::WorktreeLocked {
                path: path.cloned().unwrap_or_default(),
                reason: None,
            }
        } else if lower.contains("is a main working tree") {
            GitError::CannotRemoveMainWorktree {
                path: path.cloned().unwrap_or_default(),
            }
        } else if lower.contains("is not a working tree")
            || lower.contains("no such file or directory")
        {
            GitError::PathNotFound {
                path: path.cloned().unwrap_or_default(),
            }
        } else {
            GitError::Other {
                message: raw.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::not_a_repository(
        "fatal: not a git repository (or any of the parent directories): .git",
        GitError::NotARepository
    )]
    #[case::checked_out_elsewhere(
        "fatal: 'feature' is already checked out at '/repo-wt'",
        GitError::BranchAlreadyExists { branch: String::new() }
    )]
    #[case::dirty_tree(
        "fatal: '/repo-wt' contains modified or untracked files, use --force to delete it",
        GitError::UncommittedChanges { path: PathBuf::new(), branch: None }
    )]
    #[case::locked(
        "fatal: cannot remove a locked working tree, lock reason: testing",
        GitError::WorktreeLocked { path: PathBuf::new(), reason: None }
    )]
    #[case::main_worktree(
        "fatal: '/repo' is a main working tree",
        GitError::CannotRemoveMainWorktree { path: PathBuf::new() }
    )]
    #[case::path_not_found(
        "fatal: '/gone' is not a working tree",
        GitError::PathNotFound { path: PathBuf::new() }
    )]
    fn test_classify_recognizes_git_stderr(#[case] stderr: &str, #[case] expected: GitError) {
        let err = GitError::classify(stderr, None, None);
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&expected),
            "stderr {stderr:?} classified as {err:?}"
        );
    }

    #[test]
    fn test_classify_branch_exists() {
        let err = GitError::classify(
            "fatal: a branch named 'feature' already exists",
            None,
            Some("feature"),
        );
        match err {
            GitError::BranchAlreadyExists { branch } => assert_eq!(branch, "feature"),
            other => panic!("expected BranchAlreadyExists, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_path_occupied() {
        let path = PathBuf::from("/repo.feature");
        let err = GitError::classify(
            "fatal: '/repo.feature' already exists",
            Some(&path),
            Some("feature"),
        );
        match err {
            GitError::WorktreePathOccupied { path: p } => assert_eq!(p, path),
            other => panic!("expected WorktreePathOccupied, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_ref_not_found() {
        let err = GitError::classify(
            "fatal: invalid reference: nonexistent",
            None,
            Some("nonexistent"),
        );
        match err {
            GitError::RefNotFound { reference } => assert_eq!(reference, "nonexistent"),
            other => panic!("expected RefNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_unrecognized_preserves_raw_message() {
        let err = GitError::classify("fatal: something novel went wrong", None, None);
        match err {
            GitError::Other { message } => {
                assert_eq!(message, "fatal: something novel went wrong")
            }
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[test]
    fn test_display_mentions_branch() {
        let err = GitError::BranchAlreadyExists {
            branch: "feature-b".into(),
        };
        assert!(err.to_string().contains("feature-b"));
    }

    #[test]
    fn test_display_stale_selection_suggests_rerun() {
        let err = GitError::StaleSelection {
            detail: "worktree /repo-wt1 no longer exists".into(),
        };
        let text = err.to_string();
        assert!(text.contains("stale"));
        assert!(text.contains("re-run"));
    }
}
