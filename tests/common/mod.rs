//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use aicomm::error::{ConfirmError, ProviderError};
use aicomm::llm::{CompletionClient, CompletionRequest, RetryPolicy};
use aicomm::ui::{Action, Prompter};

/// Retry policy with millisecond waits so tests stay fast on real time.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(10),
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write test file");
    }

    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("Failed to remove test file");
    }

    /// Stage one path.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Stage everything and commit it. Returns the commit OID.
    pub fn commit_all(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("Failed to add files");
        index.update_all(["*"].iter(), None).expect("Failed to update index");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .expect("No HEAD")
            .peel_to_commit()
            .expect("HEAD is not a commit")
            .message()
            .expect("Non-UTF-8 message")
            .to_string()
    }

    /// Number of commits reachable from HEAD; 0 for an unborn branch.
    pub fn commit_count(&self) -> usize {
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }

    /// File names in HEAD's root tree.
    pub fn head_files(&self) -> Vec<String> {
        let tree = self
            .repo
            .head()
            .expect("No HEAD")
            .peel_to_tree()
            .expect("HEAD has no tree");
        tree.iter()
            .filter_map(|e| e.name().map(str::to_string))
            .collect()
    }
}

/// Completion client that replays scripted replies and counts calls.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(message: &str) -> Self {
        Self::new(vec![Ok(message.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn provider(&self) -> &'static str {
        "Scripted"
    }

    fn prompt_budget(&self) -> usize {
        12_000
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse {
                provider: "Scripted",
            }))
    }
}

/// Shares a [`ScriptedClient`] with the generator while the test keeps a handle.
pub struct SharedClient(pub std::sync::Arc<ScriptedClient>);

#[async_trait]
impl CompletionClient for SharedClient {
    fn provider(&self) -> &'static str {
        self.0.provider()
    }

    fn prompt_budget(&self) -> usize {
        self.0.prompt_budget()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.0.complete(request).await
    }
}

/// Prompter that answers from a script instead of the terminal.
pub struct ScriptedPrompter {
    pub action: Action,
    pub edits: RefCell<VecDeque<String>>,
    pub selection: Vec<String>,
    pub shown: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn accepting() -> Self {
        Self::with_action(Action::Accept)
    }

    pub fn aborting() -> Self {
        Self::with_action(Action::Abort)
    }

    pub fn editing(edits: &[&str]) -> Self {
        let prompter = Self::with_action(Action::Edit);
        prompter
            .edits
            .borrow_mut()
            .extend(edits.iter().map(|s| s.to_string()));
        prompter
    }

    pub fn selecting(files: &[&str]) -> Self {
        Self {
            selection: files.iter().map(|s| s.to_string()).collect(),
            ..Self::accepting()
        }
    }

    fn with_action(action: Action) -> Self {
        Self {
            action,
            edits: RefCell::new(VecDeque::new()),
            selection: Vec::new(),
            shown: RefCell::new(Vec::new()),
        }
    }

    /// Messages presented for confirmation, in order.
    pub fn shown(&self) -> Vec<String> {
        self.shown.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn choose_action(&self, message: &str) -> Result<Action, ConfirmError> {
        self.shown.borrow_mut().push(message.to_string());
        Ok(self.action)
    }

    fn edit_message(&self, _initial: &str, _multiline: bool) -> Result<String, ConfirmError> {
        Ok(self
            .edits
            .borrow_mut()
            .pop_front()
            .expect("edit script exhausted"))
    }

    fn select_files(&self, files: &[String]) -> Result<Vec<String>, ConfirmError> {
        Ok(self
            .selection
            .iter()
            .filter(|s| files.contains(s))
            .cloned()
            .collect())
    }

    fn reject_edit(&self, _reason: &str) {}
}
