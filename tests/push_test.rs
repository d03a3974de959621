//! Pushing commits to a local bare remote with the git CLI.

mod common;

use git2::Repository;

use aicomm::commit::push_current_branch;
use aicomm::config::Settings;
use aicomm::error::{PushError, RunError};
use aicomm::pipeline::{RunOutcome, RunRequest, run};
use aicomm::ui::Progress;
use aicomm::{FALLBACK_MESSAGE, MessageGenerator};

use common::{ScriptedPrompter, TestRepo};

fn git_available() -> bool {
    which::which("git").is_ok()
}

/// A bare repository registered as `origin` of `repo`.
fn add_bare_origin(repo: &TestRepo) -> tempfile::TempDir {
    let remote_dir = tempfile::tempdir().unwrap();
    Repository::init_bare(remote_dir.path()).unwrap();
    let url = remote_dir.path().to_str().unwrap().to_string();
    repo.repo.remote("origin", &url).unwrap();
    remote_dir
}

#[test]
fn test_push_updates_bare_remote() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    let remote_dir = add_bare_origin(&repo);
    repo.write("a.txt", "a\n");
    let oid = repo.commit_all("feat: first");

    let branch = push_current_branch(&repo.repo).unwrap();

    let remote = Repository::open_bare(remote_dir.path()).unwrap();
    let pushed = remote
        .find_reference(&format!("refs/heads/{branch}"))
        .unwrap()
        .target()
        .unwrap();
    assert_eq!(pushed, oid);
}

#[test]
fn test_push_without_remote() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");
    repo.commit_all("feat: first");

    let err = push_current_branch(&repo.repo).unwrap_err();
    assert!(matches!(err, PushError::NoRemote));
}

#[tokio::test]
async fn test_pipeline_push_failure_keeps_commit() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.write("a.txt", "a\n");
    repo.commit_all("chore: init");
    repo.repo
        .remote("origin", "/nonexistent/aicomm-remote.git")
        .unwrap();
    repo.write("a.txt", "b\n");

    let req = RunRequest {
        repo_path: repo.path().to_path_buf(),
        no_ai: true,
        push: true,
        ..RunRequest::default()
    };
    let err = run(
        &req,
        &Settings::default(),
        &MessageGenerator::without_client(),
        &ScriptedPrompter::accepting(),
        &Progress::hidden(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RunError::Push(PushError::Failed(_))));
    assert_eq!(repo.head_message(), FALLBACK_MESSAGE);
    assert_eq!(repo.commit_count(), 2);
}

#[tokio::test]
async fn test_pipeline_push_success_reports_branch() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    let _remote_dir = add_bare_origin(&repo);
    repo.write("a.txt", "a\n");
    repo.commit_all("chore: init");
    repo.write("b.txt", "b\n");

    let req = RunRequest {
        repo_path: repo.path().to_path_buf(),
        no_ai: true,
        push: true,
        ..RunRequest::default()
    };
    let outcome = run(
        &req,
        &Settings::default(),
        &MessageGenerator::without_client(),
        &ScriptedPrompter::accepting(),
        &Progress::hidden(),
    )
    .await
    .unwrap();

    match outcome {
        RunOutcome::Committed { pushed, .. } => assert!(pushed.is_some()),
        other => panic!("unexpected outcome {other:?}"),
    }
}
