//! Candidate rendering for the fuzzy finder.
//!
//! Each worktree maps to exactly one tab-delimited label:
//!
//! ```text
//! feature-a	~/src/repo.feature-a	dirty
//! main	~/src/repo	main
//! ```
//!
//! The tab is reserved as the field delimiter. Git forbids control
//! characters in ref names, so only a pathological directory name can
//! collide; when one does, rendering fails fast with `FormatCollision`
//! naming the offender instead of producing an ambiguous menu. The [`Menu`]
//! keeps the emitted labels so a selected line maps back to its candidate
//! by exact match.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::git::{GitError, Worktree};
use crate::registry::Registry;

/// Field delimiter reserved in labels.
pub const DELIMITER: char = '\t';

/// Label of the synthetic "create new worktree" entry.
pub const CREATE_LABEL: &str = "+ create new worktree";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    ExistingWorktree,
    NewWorktreePrompt,
    DeleteMarker,
}

/// One menu entry, ephemeral to a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub label: String,
    pub kind: CandidateKind,
    /// Backing worktree path; `None` for the create entry.
    pub path: Option<PathBuf>,
}

/// The full candidate list for one finder round-trip.
#[derive(Debug)]
pub struct Menu {
    candidates: Vec<Candidate>,
}

impl Menu {
    /// Menu for the select-or-create flow: every registry entry with a
    /// working tree, plus the synthetic create entry at the end.
    pub fn select(registry: &Registry, dirty_paths: &HashSet<PathBuf>) -> anyhow::Result<Self> {
        let mut candidates = render_worktrees(registry, dirty_paths, CandidateKind::ExistingWorktree)?;
        candidates.push(Candidate {
            label: CREATE_LABEL.to_string(),
            kind: CandidateKind::NewWorktreePrompt,
            path: None,
        });
        Ok(Self { candidates })
    }

    /// Menu for the delete flow: worktrees only, no create entry. The main
    /// worktree is still listed (selecting it is rejected at validation
    /// with a clear message rather than silently hidden here).
    pub fn delete(registry: &Registry, dirty_paths: &HashSet<PathBuf>) -> anyhow::Result<Self> {
        let candidates = render_worktrees(registry, dirty_paths, CandidateKind::DeleteMarker)?;
        Ok(Self { candidates })
    }

    /// Labels in menu order, one per finder input line.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.label.as_str())
    }

    /// Map a line the finder echoed back to its originating candidate.
    ///
    /// The finder returns selected lines verbatim, and labels are injective
    /// for a collision-free worktree set, so exact match is unambiguous.
    pub fn parse_selection(&self, line: &str) -> Option<&Candidate> {
        let line = line.trim_end_matches(['\r', '\n']);
        self.candidates.iter().find(|c| c.label == line)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn render_worktrees(
    registry: &Registry,
    dirty_paths: &HashSet<PathBuf>,
    kind: CandidateKind,
) -> anyhow::Result<Vec<Candidate>> {
    registry
        .iter()
        // A bare main entry has no working tree to switch into or remove.
        .filter(|wt| !wt.bare)
        .map(|wt| {
            let label = render_label(wt, registry.is_main(&wt.path), dirty_paths.contains(&wt.path))?;
            Ok(Candidate {
                label,
                kind,
                path: Some(wt.path.clone()),
            })
        })
        .collect()
}

fn render_label(wt: &Worktree, is_main: bool, dirty: bool) -> anyhow::Result<String> {
    let name = match &wt.branch {
        Some(branch) => branch.clone(),
        None => format!("(detached {})", wt.short_head()),
    };
    let path = display_path(&wt.path);

    for field in [name.as_str(), path.as_str()] {
        if field.contains(DELIMITER) {
            return Err(GitError::FormatCollision {
                name: field.to_string(),
            }
            .into());
        }
    }

    let mut flags = Vec::new();
    if is_main {
        flags.push("main");
    }
    if dirty {
        flags.push("dirty");
    }
    if wt.is_locked() {
        flags.push("locked");
    }
    if wt.is_prunable() {
        flags.push("prunable");
    }

    Ok(format!("{name}{DELIMITER}{path}{DELIMITER}{}", flags.join(" ")))
}

/// Shorten a path for display, replacing the home directory with `~`.
fn display_path(path: &Path) -> String {
    if let Some(home) = home::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
