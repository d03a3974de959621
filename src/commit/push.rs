//! Push the current branch to `origin` with the git CLI.
//!
//! libgit2 has no access to the user's credential helpers or SSH agent
//! configuration, so the push itself shells out to `git`.

use std::process::Command;

use git2::Repository;
use tracing::{debug, info};

use crate::error::PushError;
use crate::git::current_branch;

const ORIGIN: &str = "origin";

/// Push the current branch to `origin`. Returns the branch name.
pub fn push_current_branch(repo: &Repository) -> Result<String, PushError> {
    which::which("git").map_err(|_| PushError::GitNotInstalled)?;

    let branch = resolve_branch(repo)?;
    check_origin(repo)?;

    let workdir = repo
        .workdir()
        .ok_or_else(|| PushError::Failed("repository has no working tree".to_string()))?;

    info!("Pushing {branch} to {ORIGIN}");
    let output = Command::new("git")
        .args(["push", ORIGIN, &branch])
        .current_dir(workdir)
        .output()
        .map_err(PushError::Spawn)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(classify_push_failure(&branch, stderr.trim()));
    }

    debug!("git push: {}", String::from_utf8_lossy(&output.stderr).trim());
    Ok(branch)
}

fn resolve_branch(repo: &Repository) -> Result<String, PushError> {
    let branch = current_branch(repo).map_err(|_| PushError::NoBranch)?;
    let branch = branch.ok_or(PushError::NoBranch)?;

    // A branch name alone is not enough: an unborn branch has nothing to push.
    if repo.head().is_err() {
        return Err(PushError::NoBranch);
    }
    Ok(branch)
}

fn check_origin(repo: &Repository) -> Result<(), PushError> {
    let remotes = repo.remotes().map_err(PushError::Repository)?;
    let names: Vec<String> = remotes.iter().flatten().map(str::to_string).collect();

    if names.is_empty() {
        return Err(PushError::NoRemote);
    }
    if !names.iter().any(|name| name == ORIGIN) {
        return Err(PushError::MissingOrigin { remotes: names });
    }
    Ok(())
}

fn classify_push_failure(branch: &str, stderr: &str) -> PushError {
    let lower = stderr.to_lowercase();
    if lower.contains("no upstream branch") || lower.contains("has no upstream") {
        PushError::NoUpstream {
            branch: branch.to_string(),
        }
    } else {
        PushError::Failed(stderr.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn repo_with_commit(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        std::fs::write(dir.join("a.txt"), "a\n").unwrap();
        {
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("a.txt")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_no_remote_configured() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_commit(dir.path());
        assert!(matches!(check_origin(&repo), Err(PushError::NoRemote)));
    }

    #[test]
    fn test_missing_origin_lists_remotes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_commit(dir.path());
        repo.remote("upstream", "https://example.com/repo.git").unwrap();

        match check_origin(&repo) {
            Err(PushError::MissingOrigin { remotes }) => assert_eq!(remotes, vec!["upstream"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_detached_head_has_no_branch() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_commit(dir.path());
        let head = repo.head().unwrap().target().unwrap();
        repo.set_head_detached(head).unwrap();

        assert!(matches!(resolve_branch(&repo), Err(PushError::NoBranch)));
    }

    #[test]
    fn test_unborn_branch_has_nothing_to_push() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert!(matches!(resolve_branch(&repo), Err(PushError::NoBranch)));
    }

    #[test]
    fn test_classify_no_upstream() {
        let err = classify_push_failure(
            "feature",
            "fatal: The current branch feature has no upstream branch.",
        );
        assert_eq!(
            err.to_string(),
            "No upstream branch set. Run: git push --set-upstream origin feature"
        );

        let err = classify_push_failure("main", "error: failed to push some refs");
        assert!(matches!(err, PushError::Failed(_)));
    }
}
