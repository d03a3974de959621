//! Staging and committing through libgit2.

use std::path::Path;

use git2::{ErrorCode, IndexAddOption, Oid, Repository};
use tracing::{debug, info};

use crate::error::CommitError;
use crate::git::inspect;

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub oid: Oid,
    /// Whether unstaged changes were staged before committing.
    pub staged_all: bool,
}

/// Stage everything, like `git add -A`: new, modified and deleted files.
pub fn stage_all(repo: &Repository) -> Result<(), CommitError> {
    let mut index = repo.index().map_err(CommitError::StagingFailed)?;
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .map_err(CommitError::StagingFailed)?;
    index
        .update_all(["*"].iter(), None)
        .map_err(CommitError::StagingFailed)?;
    index.write().map_err(CommitError::StagingFailed)?;
    Ok(())
}

/// Stage only the given workdir-relative paths. Paths missing from disk are staged as deletions.
pub fn stage_paths(repo: &Repository, paths: &[String]) -> Result<(), CommitError> {
    let workdir = repo.workdir().unwrap_or_else(|| Path::new("."));
    let mut index = repo.index().map_err(CommitError::StagingFailed)?;

    for path in paths {
        let relative = Path::new(path);
        if workdir.join(relative).exists() {
            index.add_path(relative).map_err(CommitError::StagingFailed)?;
        } else {
            index
                .remove_path(relative)
                .map_err(CommitError::StagingFailed)?;
        }
    }

    index.write().map_err(CommitError::StagingFailed)?;
    debug!("Staged {} selected path(s)", paths.len());
    Ok(())
}

/// Commit with `message`.
///
/// If anything is staged, only the staged set is committed. Otherwise all
/// unstaged changes are staged first. A clean workspace is an error.
pub fn commit_changes(repo: &Repository, message: &str) -> Result<CommitOutcome, CommitError> {
    let status = inspect(repo)?;

    let staged_all = if status.has_staged_changes() {
        false
    } else if status.has_unstaged_changes() {
        info!("No staged changes, staging all changes");
        stage_all(repo)?;
        true
    } else {
        return Err(CommitError::NothingToCommit);
    };

    let oid = create_commit(repo, message)?;
    Ok(CommitOutcome { oid, staged_all })
}

/// Write the index as a tree and commit it on HEAD.
fn create_commit(repo: &Repository, message: &str) -> Result<Oid, CommitError> {
    let mut index = repo.index().map_err(CommitError::StagingFailed)?;
    let tree_id = index.write_tree().map_err(CommitError::StagingFailed)?;
    let tree = repo.find_tree(tree_id).map_err(CommitError::CommitFailed)?;

    let sig = repo.signature().map_err(CommitError::ConfigError)?;

    // Unborn HEAD: first commit has no parent.
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(CommitError::CommitFailed)?),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
        Err(e) => return Err(CommitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(CommitError::CommitFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        (dir, repo)
    }

    fn head_message(repo: &Repository) -> String {
        repo.head()
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .message()
            .unwrap()
            .to_string()
    }

    fn head_files(repo: &Repository) -> Vec<String> {
        let tree = repo.head().unwrap().peel_to_tree().unwrap();
        tree.iter().map(|e| e.name().unwrap().to_string()).collect()
    }

    #[test]
    fn test_first_commit_on_unborn_branch() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();

        let outcome = commit_changes(&repo, "feat: initial import").unwrap();
        assert!(outcome.staged_all);
        assert_eq!(head_message(&repo), "feat: initial import");
        assert_eq!(head_files(&repo), vec!["a.txt"]);
    }

    #[test]
    fn test_commits_only_staged_set() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_changes(&repo, "chore: init").unwrap();

        fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        fs::write(dir.path().join("c.txt"), "c\n").unwrap();
        stage_paths(&repo, &["b.txt".to_string()]).unwrap();

        let outcome = commit_changes(&repo, "feat: add b").unwrap();
        assert!(!outcome.staged_all);
        assert_eq!(head_files(&repo), vec!["a.txt", "b.txt"]);

        let status = inspect(&repo).unwrap();
        assert_eq!(status.created, vec!["c.txt"]);
    }

    #[test]
    fn test_clean_workspace_is_nothing_to_commit() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_changes(&repo, "chore: init").unwrap();

        let err = commit_changes(&repo, "fix: nothing").unwrap_err();
        assert!(matches!(err, CommitError::NothingToCommit));
    }

    #[test]
    fn test_stage_all_includes_deletions() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        commit_changes(&repo, "chore: init").unwrap();

        fs::remove_file(dir.path().join("a.txt")).unwrap();
        commit_changes(&repo, "chore: remove a").unwrap();
        assert_eq!(head_files(&repo), vec!["b.txt"]);
    }

    #[test]
    fn test_stage_paths_stages_deletion() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_changes(&repo, "chore: init").unwrap();

        fs::remove_file(dir.path().join("a.txt")).unwrap();
        stage_paths(&repo, &["a.txt".to_string()]).unwrap();
        let status = inspect(&repo).unwrap();
        assert_eq!(status.staged, vec!["a.txt"]);
    }
}
