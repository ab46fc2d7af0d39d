//! Parsing of `git worktree list --porcelain` output.

use std::path::PathBuf;

use super::{GitError, Worktree};

impl Worktree {
    /// Parse the porcelain worktree list into entries.
    ///
    /// The porcelain format is one attribute per line, entries separated by
    /// blank lines. Unknown attributes are ignored for forward compatibility.
    pub(crate) fn parse_porcelain_list(output: &str) -> Result<Vec<Self>, GitError> {
        output
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(Self::parse_porcelain_entry)
            .collect()
    }

    fn parse_porcelain_entry(block: &str) -> Result<Self, GitError> {
        let mut lines = block.lines();

        let first = lines.next().unwrap_or_default();
        let path = first
            .strip_prefix("worktree ")
            .ok_or_else(|| GitError::ParseError {
                message: format!("expected 'worktree <path>' line, got {first:?}"),
            })?;

        let mut wt = Worktree {
            path: PathBuf::from(path),
            head: String::new(),
            branch: None,
            bare: false,
            detached: false,
            locked: None,
            prunable: None,
        };

        for line in lines {
            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, Some(v)),
                None => (line, None),
            };
            match key {
                "HEAD" => {
                    wt.head = value
                        .ok_or_else(|| GitError::ParseError {
                            message: "HEAD line missing commit hash".into(),
                        })?
                        .to_string();
                }
                "branch" => {
                    let branch_ref = value.ok_or_else(|| GitError::ParseError {
                        message: "branch line missing ref".into(),
                    })?;
                    wt.branch = Some(
                        branch_ref
                            .strip_prefix("refs/heads/")
                            .unwrap_or(branch_ref)
                            .to_string(),
                    );
                }
                "bare" => wt.bare = true,
                "detached" => wt.detached = true,
                "locked" => wt.locked = Some(value.unwrap_or_default().to_string()),
                "prunable" => wt.prunable = Some(value.unwrap_or_default().to_string()),
                // Unknown attributes: ignore
                _ => {}
            }
        }

        Ok(wt)
    }
}
