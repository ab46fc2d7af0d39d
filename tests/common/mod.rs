//! Shared test fixtures.
//!
//! `TestRepo` builds a real git repository in a tempdir with an isolated
//! git environment, so tests never see (or touch) the host's config.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use git_wt::git::Repository;

/// Null device path, platform-appropriate. Used as GIT_CONFIG_SYSTEM to
/// disable system config in tests.
#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// A throwaway git repository with one initial commit on `main`.
///
/// The repo lives at `<tempdir>/repo`, so worktrees created with the
/// derived `<parent>/<repo>.<branch>` layout stay inside the tempdir and
/// are cleaned up with it.
pub struct TestRepo {
    // Held for its Drop; removing the tempdir removes everything.
    _temp_dir: TempDir,
    root: PathBuf,
    git_config_path: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();

        let git_config_path = temp_dir.path().join("test-gitconfig");
        std::fs::write(
            &git_config_path,
            "[user]\n\tname = Test User\n\temail = test@example.com\n",
        )
        .unwrap();

        let root = temp_dir.path().join("repo");
        std::fs::create_dir(&root).unwrap();
        // Canonicalize so paths compare equal with git's output (macOS
        // tempdirs live behind a /var -> /private/var symlink).
        let root = dunce::canonicalize(&root).unwrap();

        let repo = Self {
            _temp_dir: temp_dir,
            root,
            git_config_path,
        };

        // -b main keeps the branch name independent of host config.
        repo.run_git(&["init", "-q", "-b", "main"]);
        repo.commit(&repo.root, "initial");

        repo
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Gateway handle rooted at this repo.
    pub fn repository(&self) -> Repository {
        Repository::at(&self.root)
    }

    /// A git command in `dir` with config isolated to this fixture.
    pub fn git_command(&self, dir: &Path) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(dir);
        cmd.env("GIT_CONFIG_GLOBAL", &self.git_config_path);
        cmd.env("GIT_CONFIG_SYSTEM", NULL_DEVICE);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.env("LC_ALL", "C");
        cmd
    }

    /// Run git in the repo root, panicking with full output on failure.
    pub fn run_git(&self, args: &[&str]) -> String {
        self.run_git_in(&self.root, args)
    }

    pub fn run_git_in(&self, dir: &Path, args: &[&str]) -> String {
        let output = self.git_command(dir).args(args).output().unwrap();
        assert!(
            output.status.success(),
            "git {} failed:\nstdout: {}\nstderr: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Write `file.txt` in `dir`, stage it, and commit.
    pub fn commit(&self, dir: &Path, message: &str) {
        std::fs::write(dir.join("file.txt"), message).unwrap();
        self.run_git_in(dir, &["add", "file.txt"]);
        self.run_git_in(dir, &["commit", "-q", "-m", message]);
    }

    /// Add a linked worktree for a new branch, using the same sibling
    /// layout the tool derives (`<parent>/repo.<branch>`).
    pub fn add_worktree(&self, branch: &str) -> PathBuf {
        let path = self.worktree_path(branch);
        let path_str = path.to_str().unwrap();
        self.run_git(&["worktree", "add", "-q", path_str, "-b", branch, "main"]);
        path
    }

    /// Where a worktree for `branch` would live.
    pub fn worktree_path(&self, branch: &str) -> PathBuf {
        let parent = self.root.parent().unwrap();
        parent.join(format!("repo.{}", branch.replace('/', "-")))
    }

    /// Leave an uncommitted change in `dir`.
    pub fn make_dirty(&self, dir: &Path) {
        std::fs::write(dir.join("file.txt"), "uncommitted change").unwrap();
    }

    /// Branch names of all registered worktrees, via git directly (not
    /// through the code under test).
    pub fn listed_branches(&self) -> Vec<String> {
        self.run_git(&["worktree", "list", "--porcelain"])
            .lines()
            .filter_map(|l| l.strip_prefix("branch refs/heads/"))
            .map(String::from)
            .collect()
    }
}
