//! Git gateway: worktree types and repository operations.
//!
//! All interaction with git happens here, behind [`Repository`]. The rest
//! of the crate treats git as an opaque command-line oracle: it issues one
//! of a small fixed set of operations and gets typed results or a
//! [`GitError`] back. Nothing is cached across runs; the repository state
//! on disk is the sole source of truth.

use std::path::PathBuf;

mod error;
mod parse;
mod repository;

pub use error::GitError;
pub use repository::Repository;

/// One entry from `git worktree list --porcelain`.
///
/// Identity is the path; git guarantees the main worktree is listed first.
#[derive(Debug, Clone, PartialEq)]
pub struct Worktree {
    pub path: PathBuf,
    /// HEAD commit hash; empty only for a bare entry.
    pub head: String,
    /// Checked-out branch, or `None` for detached HEAD.
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    /// Lock reason if locked (empty string when locked without a reason).
    pub locked: Option<String>,
    /// Prune reason as reported by git, e.g. "gitdir file points to non-existent location".
    pub prunable: Option<String>,
}

impl Worktree {
    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    pub fn is_prunable(&self) -> bool {
        self.prunable.is_some()
    }

    /// Abbreviated HEAD hash for display.
    pub fn short_head(&self) -> &str {
        &self.head[..self.head.len().min(8)]
    }
}
