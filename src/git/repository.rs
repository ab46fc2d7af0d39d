use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use dunce::canonicalize;

use super::{GitError, Worktree};
use crate::shell_exec;

/// Repository context for git operations.
///
/// Every gateway operation is one synchronous round-trip to the git CLI;
/// nothing is cached. Create and remove are the only operations with
/// externally visible persistent effects.
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    /// Create a repository context rooted at the specified directory.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a repository context for the current directory.
    pub fn current() -> Self {
        Self::at(".")
    }

    pub fn base_path(&self) -> &Path {
        &self.path
    }

    /// Run git in the repository directory, returning stdout on success.
    ///
    /// Non-zero exits are classified into [`GitError`] by stderr content.
    fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        self.run_command_in(&self.path, args, None, None)
    }

    fn run_command_in(
        &self,
        dir: &Path,
        args: &[&str],
        context_path: Option<&PathBuf>,
        context_branch: Option<&str>,
    ) -> anyhow::Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(dir);

        let output = match shell_exec::run(&mut cmd) {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GitError::VcsUnavailable {
                    detail: e.to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to execute: git {}", args.join(" ")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            for line in stderr.trim().lines() {
                log::debug!("  ! {}", line);
            }
            return Err(GitError::classify(&stderr, context_path, context_branch).into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Check that the context directory is inside a git-managed tree.
    ///
    /// Errors with [`GitError::NotARepository`] otherwise; every entry
    /// operation calls this first so the failure is reported before any
    /// menu is shown.
    pub fn ensure_repository(&self) -> anyhow::Result<()> {
        self.run_command(&["rev-parse", "--git-dir"])?;
        Ok(())
    }

    /// List all worktrees for this repository.
    ///
    /// Git lists the main entry first (the bare repository itself in a
    /// bare layout); that ordering is preserved so the registry can rely
    /// on it.
    pub fn list_worktrees(&self) -> anyhow::Result<Vec<Worktree>> {
        let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
        Ok(Worktree::parse_porcelain_list(&stdout)?)
    }

    /// Create a new worktree at `path` on a new branch `branch` from `base_ref`.
    ///
    /// Fails with `BranchAlreadyExists`, `WorktreePathOccupied`, or
    /// `RefNotFound`. On success the fresh entry is re-read from git rather
    /// than synthesized, so the returned [`Worktree`] reflects the oracle's
    /// view (canonical path, HEAD hash).
    pub fn create_worktree(
        &self,
        path: &Path,
        branch: &str,
        base_ref: &str,
    ) -> anyhow::Result<Worktree> {
        let path_str = path_as_str(path)?;
        let path_buf = path.to_path_buf();
        self.run_command_in(
            &self.path,
            &["worktree", "add", path_str, "-b", branch, base_ref],
            Some(&path_buf),
            Some(branch),
        )?;

        self.list_worktrees()?
            .into_iter()
            .find(|wt| wt.branch.as_deref() == Some(branch))
            .ok_or_else(|| {
                GitError::Other {
                    message: format!("Created worktree for {branch} but git does not list it"),
                }
                .into()
            })
    }

    /// Remove the worktree at `path`.
    ///
    /// Without `force` this fails with `UncommittedChanges` when the tree
    /// is dirty; it never escalates on its own. Locked worktrees fail with
    /// `WorktreeLocked` regardless of `force`.
    pub fn remove_worktree(&self, path: &Path, force: bool) -> anyhow::Result<()> {
        let path_str = path_as_str(path)?;
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(path_str);
        let path_buf = path.to_path_buf();
        self.run_command_in(&self.path, &args, Some(&path_buf), None)?;
        Ok(())
    }

    /// Check whether the working tree at `path` has no uncommitted changes.
    pub fn is_clean(&self, path: &Path) -> anyhow::Result<bool> {
        let stdout = self.run_command_in(path, &["status", "--porcelain"], None, None)?;
        Ok(stdout.trim().is_empty())
    }

    /// Check if a local branch exists.
    pub fn branch_exists(&self, branch: &str) -> bool {
        self.run_command(&["rev-parse", "--verify", &format!("refs/heads/{branch}")])
            .is_ok()
    }

    /// Check if a ref resolves to a commit (branch, tag, or hash).
    pub fn ref_exists(&self, reference: &str) -> bool {
        self.run_command(&["rev-parse", "--verify", &format!("{reference}^{{commit}}")])
            .is_ok()
    }

    /// The repository root: parent of the shared `.git` directory.
    ///
    /// New worktree paths are derived relative to this.
    pub fn worktree_base(&self) -> anyhow::Result<PathBuf> {
        let stdout = self.run_command(&["rev-parse", "--git-common-dir"])?;
        let git_dir = PathBuf::from(stdout.trim());
        let git_dir = if git_dir.is_relative() {
            canonicalize(self.path.join(&git_dir)).context("Failed to resolve git directory")?
        } else {
            canonicalize(&git_dir).context("Failed to resolve git directory")?
        };
        git_dir
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                GitError::Other {
                    message: format!("Git directory has no parent: {}", git_dir.display()),
                }
                .into()
            })
    }

    /// Derive the on-disk path for a new worktree: a sibling of the repo
    /// root named `<repo>.<branch>`, with `/` in branch names mapped to `-`
    /// so nested branch names stay a single directory.
    pub fn derive_worktree_path(&self, branch: &str) -> anyhow::Result<PathBuf> {
        let root = self.worktree_base()?;
        let repo_name = root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GitError::Other {
                message: format!("Cannot derive repository name from {}", root.display()),
            })?;
        let parent = root.parent().ok_or_else(|| GitError::Other {
            message: format!("Repository root has no parent: {}", root.display()),
        })?;
        let safe_branch = branch.replace('/', "-");
        Ok(parent.join(format!("{repo_name}.{safe_branch}")))
    }
}

fn path_as_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str().ok_or_else(|| {
        GitError::Other {
            message: format!("Path contains invalid UTF-8: {}", path.display()),
        }
        .into()
    })
}
