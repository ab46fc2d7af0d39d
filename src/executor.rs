//! Action validation and execution.
//!
//! Every session resolves to exactly one [`Action`]. The executor walks a
//! fixed phase sequence (idle, validating, executing, then done or failed)
//! with no retries and no fallback: validation runs against a registry
//! snapshot taken in the same process run, and any git failure surfaces to
//! the caller verbatim.

use std::path::PathBuf;

use crate::git::{GitError, Repository};
use crate::registry::Registry;
use crate::styling;

/// The single mutation (or navigation) a session resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Change into an existing worktree.
    Switch { path: PathBuf },
    /// Create a worktree on a new branch cut from `base_ref`.
    Create { branch: String, base_ref: String },
    /// Remove a linked worktree. `force` is only ever set by an explicit
    /// user flag, never escalated to.
    Delete { path: PathBuf, force: bool },
    /// User backed out; a successful no-op.
    Cancel,
}

/// Executor lifecycle phase, advanced monotonically by [`Executor::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Validating,
    Executing,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Cancelled,
    Failed,
}

/// What one session produced, handed to the shell bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub status: Status,
    /// Directory the caller's shell should change into, when there is one.
    pub target_path: Option<PathBuf>,
    /// Human-readable completion message for stderr.
    pub message: Option<String>,
}

impl SessionResult {
    fn cancelled() -> Self {
        Self {
            status: Status::Cancelled,
            target_path: None,
            message: None,
        }
    }
}

/// Runs one action to completion. One executor serves one action; the
/// delete flow constructs a fresh one per target so each removal is
/// validated and reported independently.
pub struct Executor<'a> {
    repo: &'a Repository,
    phase: Phase,
}

impl<'a> Executor<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            phase: Phase::Idle,
        }
    }

    /// Validate `action` against `registry`, then execute it.
    ///
    /// `registry` must be a snapshot from this process run; validation
    /// catches selections that went stale between listing and acting.
    /// Errors leave the executor in its failed phase and propagate
    /// unmodified.
    pub fn run(&mut self, registry: &Registry, action: Action) -> anyhow::Result<SessionResult> {
        let result = self.advance(registry, action);
        self.phase = match &result {
            Ok(_) => Phase::Done,
            Err(_) => Phase::Failed,
        };
        log::debug!("executor finished in phase {:?}", self.phase);
        result
    }

    fn advance(&mut self, registry: &Registry, action: Action) -> anyhow::Result<SessionResult> {
        if let Action::Cancel = action {
            // Cancellation skips validation and execution entirely; no
            // git command runs on this path.
            return Ok(SessionResult::cancelled());
        }

        self.phase = Phase::Validating;
        validate(registry, &action, self.repo)?;

        self.phase = Phase::Executing;
        match action {
            Action::Switch { path } => Ok(SessionResult {
                status: Status::Success,
                target_path: Some(path),
                message: None,
            }),
            Action::Create { branch, base_ref } => {
                let path = self.repo.derive_worktree_path(&branch)?;
                let created = self.repo.create_worktree(&path, &branch, &base_ref)?;
                Ok(SessionResult {
                    status: Status::Success,
                    message: Some(styling::success_message(format!(
                        "Created worktree for {} at {}",
                        branch,
                        created.path.display()
                    ))),
                    target_path: Some(created.path),
                })
            }
            Action::Delete { path, force } => {
                // `worktree remove` also handles entries whose directory is
                // already gone, deregistering just this path; only the
                // message differs.
                let prunable = registry
                    .find_by_path(&path)
                    .is_some_and(crate::git::Worktree::is_prunable);
                self.repo.remove_worktree(&path, force)?;
                let message = if prunable {
                    format!("Pruned stale worktree entry {}", path.display())
                } else {
                    format!("Removed worktree {}", path.display())
                };
                Ok(SessionResult {
                    status: Status::Success,
                    target_path: None,
                    message: Some(styling::success_message(message)),
                })
            }
            Action::Cancel => unreachable!("handled before validation"),
        }
    }
}

/// Precondition checks, ordered so registry-only rejections (stale
/// selection, main-worktree delete) happen before git is consulted at all.
fn validate(registry: &Registry, action: &Action, repo: &Repository) -> anyhow::Result<()> {
    match action {
        Action::Switch { path } => {
            if registry.find_by_path(path).is_none() {
                return Err(GitError::StaleSelection {
                    detail: format!("{} is no longer a registered worktree", path.display()),
                }
                .into());
            }
        }
        Action::Delete { path, .. } => {
            if registry.find_by_path(path).is_none() {
                return Err(GitError::StaleSelection {
                    detail: format!("{} is no longer a registered worktree", path.display()),
                }
                .into());
            }
            if registry.is_main(path) {
                return Err(GitError::CannotRemoveMainWorktree {
                    path: path.clone(),
                }
                .into());
            }
        }
        Action::Create { branch, base_ref } => {
            if registry.has_branch(branch) || repo.branch_exists(branch) {
                return Err(GitError::BranchAlreadyExists {
                    branch: branch.clone(),
                }
                .into());
            }
            if !repo.ref_exists(base_ref) {
                return Err(GitError::RefNotFound {
                    reference: base_ref.clone(),
                }
                .into());
            }
        }
        Action::Cancel => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Worktree;

    fn worktree_at(dir: &tempfile::TempDir, name: &str, branch: &str) -> Worktree {
        let path = dir.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        Worktree {
            path,
            head: "deadbeef".into(),
            branch: Some(branch.into()),
            bare: false,
            detached: false,
            locked: None,
            prunable: None,
        }
    }

    fn fixture(dir: &tempfile::TempDir) -> (Repository, Registry) {
        let registry = Registry::from_raw(vec![
            worktree_at(dir, "repo", "main"),
            worktree_at(dir, "repo.a", "feature-a"),
        ])
        .unwrap();
        (Repository::at(dir.path().join("repo")), registry)
    }

    #[test]
    fn test_cancel_is_a_successful_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, registry) = fixture(&dir);
        let result = Executor::new(&repo).run(&registry, Action::Cancel).unwrap();
        assert_eq!(result.status, Status::Cancelled);
        assert_eq!(result.target_path, None);
        assert_eq!(result.message, None);
    }

    #[test]
    fn test_switch_to_registered_worktree() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, registry) = fixture(&dir);
        let target = dir.path().join("repo.a");
        let result = Executor::new(&repo)
            .run(
                &registry,
                Action::Switch {
                    path: target.clone(),
                },
            )
            .unwrap();
        assert_eq!(result.status, Status::Success);
        assert_eq!(result.target_path, Some(target));
    }

    #[test]
    fn test_switch_to_vanished_worktree_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, registry) = fixture(&dir);
        let err = Executor::new(&repo)
            .run(
                &registry,
                Action::Switch {
                    path: dir.path().join("repo.gone"),
                },
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::StaleSelection { .. })
        ));
    }

    #[test]
    fn test_delete_main_worktree_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, registry) = fixture(&dir);
        let err = Executor::new(&repo)
            .run(
                &registry,
                Action::Delete {
                    path: dir.path().join("repo"),
                    force: false,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::CannotRemoveMainWorktree { .. })
        ));
    }

    #[test]
    fn test_delete_stale_selection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, registry) = fixture(&dir);
        let err = Executor::new(&repo)
            .run(
                &registry,
                Action::Delete {
                    path: dir.path().join("repo.gone"),
                    force: false,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::StaleSelection { .. })
        ));
    }

    #[test]
    fn test_create_with_branch_already_in_registry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, registry) = fixture(&dir);
        let err = Executor::new(&repo)
            .run(
                &registry,
                Action::Create {
                    branch: "feature-a".into(),
                    base_ref: "main".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::BranchAlreadyExists { .. })
        ));
    }
}
