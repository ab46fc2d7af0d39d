//! In-memory snapshot of the repository's worktrees.
//!
//! A [`Registry`] is rebuilt from the git gateway on every invocation and
//! never patched in place: after any create or remove, callers take a new
//! snapshot instead of mutating this one. That keeps the menu and the
//! oracle from drifting apart.

use std::path::Path;

use normalize_path::NormalizePath;

use crate::git::{GitError, Repository, Worktree};

/// A consistent snapshot of the current worktrees.
///
/// Ordering is deterministic for identical input: the main worktree first
/// (git lists it first), remaining worktrees sorted lexically by path, so
/// the menu is stable across repeated invocations with no intervening
/// changes.
///
/// Entries whose directory vanished without git tagging them prunable are
/// discarded; prunable entries are kept and tagged so the user can choose
/// to remove them.
#[derive(Debug, Clone)]
pub struct Registry {
    worktrees: Vec<Worktree>,
}

impl Registry {
    /// Build a fresh snapshot from the gateway.
    pub fn snapshot(repo: &Repository) -> anyhow::Result<Self> {
        Self::from_raw(repo.list_worktrees()?)
    }

    /// Construct from raw gateway output (main entry listed first).
    ///
    /// In a bare layout the first entry is the bare repository itself; it
    /// stays the distinguished main (menus hide it) rather than promoting
    /// a linked worktree into that role.
    ///
    /// Fails if no entry remains; a repository always has at least its
    /// main entry, so an empty list means the oracle's output was not
    /// understood.
    pub fn from_raw(raw: Vec<Worktree>) -> anyhow::Result<Self> {
        let mut entries = raw.into_iter();

        let Some(main) = entries.next() else {
            return Err(GitError::Other {
                message: "No worktrees found".into(),
            }
            .into());
        };

        let mut linked: Vec<Worktree> = entries
            .filter(|wt| wt.path.exists() || wt.is_prunable())
            .collect();
        linked.sort_by(|a, b| a.path.cmp(&b.path));

        let mut worktrees = Vec::with_capacity(linked.len() + 1);
        worktrees.push(main);
        worktrees.extend(linked);

        Ok(Self { worktrees })
    }

    /// The main worktree. Cannot be removed through this tool.
    pub fn main(&self) -> &Worktree {
        &self.worktrees[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worktree> {
        self.worktrees.iter()
    }

    pub fn len(&self) -> usize {
        self.worktrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worktrees.is_empty()
    }

    /// Find an entry by path, comparing lexically normalized paths so the
    /// lookup works even when the directory no longer exists.
    pub fn find_by_path(&self, path: &Path) -> Option<&Worktree> {
        let normalized = path.normalize();
        self.worktrees
            .iter()
            .find(|wt| wt.path.normalize() == normalized)
    }

    pub fn is_main(&self, path: &Path) -> bool {
        self.main().path.normalize() == path.normalize()
    }

    /// Whether any worktree has this branch checked out.
    pub fn has_branch(&self, branch: &str) -> bool {
        self.worktrees
            .iter()
            .any(|wt| wt.branch.as_deref() == Some(branch))
    }
}
