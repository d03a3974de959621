//! Diff collection from the index and working tree using git2.

use std::path::Path;

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::debug;

use crate::config::Settings;
use crate::error::DiffError;
use crate::git::status::WorkspaceStatus;

/// Lock files whose diffs are large and say nothing about intent.
pub const LOCK_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "Cargo.lock",
    "composer.lock",
    "Gemfile.lock",
    "poetry.lock",
];

/// What to include in the collected diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRequest {
    /// Index against HEAD.
    pub staged: bool,
    /// Working tree (including untracked file content) against the index.
    pub unstaged: bool,
    /// When only `staged` is requested and it is empty, use the unstaged diff instead.
    pub unstaged_fallback: bool,
    pub context_lines: u32,
    /// Hard cap on output lines; the excess is replaced by one marker line.
    pub max_lines: usize,
    pub exclude_lock_files: bool,
}

impl DiffRequest {
    /// Default policy: staged-only when something is staged, since that is
    /// exactly what gets committed; otherwise fall back to the unstaged diff.
    pub fn for_status(status: &WorkspaceStatus, settings: &Settings) -> Self {
        Self {
            staged: true,
            unstaged: false,
            unstaged_fallback: !status.has_staged_changes(),
            context_lines: settings.context_lines,
            max_lines: settings.max_diff_lines,
            exclude_lock_files: settings.exclude_lock_files,
        }
    }
}

/// Produce the diff text to summarize.
///
/// Returns an empty string (not an error) when there is nothing to show.
pub fn collect_diff(repo: &Repository, request: &DiffRequest) -> Result<String, DiffError> {
    let mut text = String::new();

    if request.staged {
        let staged = staged_diff(repo, request.context_lines)?;
        text.push_str(&render(&staged, request.exclude_lock_files)?);
    }

    if request.unstaged {
        let unstaged = unstaged_diff(repo, request.context_lines)?;
        text.push_str(&render(&unstaged, request.exclude_lock_files)?);
    } else if request.staged && request.unstaged_fallback && text.trim().is_empty() {
        debug!("No staged diff; falling back to unstaged changes");
        let unstaged = unstaged_diff(repo, request.context_lines)?;
        text = render(&unstaged, request.exclude_lock_files)?;
    }

    if text.trim().is_empty() {
        return Ok(String::new());
    }

    Ok(truncate_lines(&text, request.max_lines))
}

/// Keep the first `max_lines` lines and append one marker line for the rest.
pub fn truncate_lines(text: &str, max_lines: usize) -> String {
    let total = text.lines().count();
    if total <= max_lines {
        return text.to_string();
    }

    let omitted = total - max_lines;
    let mut out: String = text
        .lines()
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out.push_str(&format!("[... {omitted} more lines truncated ...]"));
    out
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, DiffError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(DiffError::Diff(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(DiffError::Diff)?;
    Ok(Some(tree))
}

fn staged_diff(repo: &Repository, context_lines: u32) -> Result<Diff<'_>, DiffError> {
    let head_tree = resolve_head_tree(repo)?;
    let mut opts = DiffOptions::new();
    opts.context_lines(context_lines);
    repo.diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
        .map_err(DiffError::Diff)
}

fn unstaged_diff(repo: &Repository, context_lines: u32) -> Result<Diff<'_>, DiffError> {
    let mut opts = DiffOptions::new();
    opts.context_lines(context_lines)
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);
    repo.diff_index_to_workdir(None, Some(&mut opts))
        .map_err(DiffError::Diff)
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| LOCK_FILES.contains(&name))
}

/// Render a diff as unified patch text.
fn render(diff: &Diff<'_>, exclude_lock_files: bool) -> Result<String, DiffError> {
    let mut text = String::new();

    diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        if exclude_lock_files {
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            if path.is_some_and(is_lock_file) {
                return true;
            }
        }

        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));

        true
    })
    .map_err(DiffError::Diff)?;

    Ok(text)
}
