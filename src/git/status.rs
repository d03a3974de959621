//! Workspace inspection: what changed, what is staged, and where HEAD points.

use std::path::Path;

use git2::{BranchType, ErrorCode, Repository, Status, StatusOptions};
use tracing::debug;

use crate::error::{DiffError, EnvironmentError};

/// Snapshot of the working tree for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceStatus {
    /// Tracked files with unstaged content changes.
    pub modified: Vec<String>,
    /// Untracked files.
    pub created: Vec<String>,
    /// Tracked files removed from the working tree but not from the index.
    pub deleted: Vec<String>,
    /// Files with changes recorded in the index.
    pub staged: Vec<String>,
    /// Current branch; `None` when HEAD is detached.
    pub branch: Option<String>,
    /// Upstream tracking branch, e.g. `origin/main`.
    pub tracking: Option<String>,
    pub ahead: usize,
    pub behind: usize,
}

impl WorkspaceStatus {
    pub fn has_changes(&self) -> bool {
        self.has_staged_changes() || self.has_unstaged_changes()
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.staged.is_empty()
    }

    pub fn has_unstaged_changes(&self) -> bool {
        !self.modified.is_empty() || !self.created.is_empty() || !self.deleted.is_empty()
    }

    /// Every path with unstaged work, in a stable order without duplicates.
    pub fn unstaged_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .modified
            .iter()
            .chain(&self.created)
            .chain(&self.deleted)
            .cloned()
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

/// Open the repository containing `path`.
///
/// Fails with [`EnvironmentError::NotARepository`] outside a git work tree.
pub fn open_repository(path: &Path) -> Result<Repository, EnvironmentError> {
    let repo = Repository::discover(path).map_err(|source| EnvironmentError::NotARepository {
        path: path.to_path_buf(),
        source,
    })?;

    if repo.is_bare() {
        return Err(EnvironmentError::BareRepository);
    }

    Ok(repo)
}

/// Query the repository for its current status. No side effects.
pub fn inspect(repo: &Repository) -> Result<WorkspaceStatus, DiffError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true);

    let statuses = repo.statuses(Some(&mut opts)).map_err(DiffError::Status)?;

    let mut status = WorkspaceStatus::default();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else {
            continue;
        };
        let flags = entry.status();
        classify(&mut status, path, flags);
    }

    status.branch = current_branch(repo)?;
    if let Some(branch) = status.branch.as_deref() {
        if let Some((tracking, ahead, behind)) = upstream_info(repo, branch) {
            status.tracking = Some(tracking);
            status.ahead = ahead;
            status.behind = behind;
        }
    }

    debug!(
        "Workspace: {} modified, {} created, {} deleted, {} staged",
        status.modified.len(),
        status.created.len(),
        status.deleted.len(),
        status.staged.len()
    );

    Ok(status)
}

fn classify(status: &mut WorkspaceStatus, path: &str, flags: Status) {
    let path = path.to_string();

    if flags.intersects(
        Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE,
    ) {
        status.staged.push(path.clone());
    }

    if flags.contains(Status::WT_NEW) {
        status.created.push(path);
    } else if flags.contains(Status::WT_DELETED) {
        status.deleted.push(path);
    } else if flags.intersects(Status::WT_MODIFIED | Status::WT_TYPECHANGE | Status::WT_RENAMED) {
        status.modified.push(path);
    }
}

/// Current branch name; `Ok(None)` when HEAD is detached.
///
/// An unborn branch (fresh repository) still reports the name HEAD points to.
pub fn current_branch(repo: &Repository) -> Result<Option<String>, DiffError> {
    match repo.head() {
        Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
        Ok(_) => Ok(None),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            let head = repo.find_reference("HEAD").map_err(DiffError::Status)?;
            Ok(head
                .symbolic_target()
                .and_then(|t| t.strip_prefix("refs/heads/"))
                .map(str::to_string))
        }
        Err(e) => Err(DiffError::Status(e)),
    }
}

/// Upstream name plus ahead/behind counts, if the branch tracks one.
fn upstream_info(repo: &Repository, branch: &str) -> Option<(String, usize, usize)> {
    let local = repo.find_branch(branch, BranchType::Local).ok()?;
    let upstream = local.upstream().ok()?;
    let name = upstream.name().ok().flatten()?.to_string();

    let local_oid = local.get().target()?;
    let upstream_oid = upstream.get().target()?;
    let (ahead, behind) = repo.graph_ahead_behind(local_oid, upstream_oid).ok()?;

    Some((name, ahead, behind))
}
