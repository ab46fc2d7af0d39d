//! Interactive git worktree manager with fuzzy-finder selection.
//!
//! git-wt is a CLI tool; the binary in `main.rs` is the supported
//! interface and this library API is not stable.
//!
//! One invocation runs one session: list the repository's worktrees,
//! present them through a fuzzy finder, and carry out the single action
//! the user picks (switch, create, or delete). Nothing is cached between
//! runs; git itself is the only source of truth.

pub mod executor;
pub mod finder;
pub mod git;
pub mod menu;
pub mod output;
pub mod registry;
pub mod shell;
pub mod shell_exec;
pub mod styling;
