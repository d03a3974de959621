//! Error types for aicomm modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors about the environment the tool runs in.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Not a git repository ({path}). Please run this command inside a git project.")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Bare repositories are not supported (no working tree)")]
    BareRepository,

    #[error("{var} is not set. Export it or add it to your shell profile, or run with --no-ai.")]
    MissingCredential { provider: String, var: String },

    #[error("Local model engine at {endpoint} is offline: {reason}. Start it with `ollama serve` or run with --no-ai.")]
    EngineOffline { endpoint: String, reason: String },

    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors from loading `.aicommrc` settings files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}. Please check JSON formatting: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for '{key}' in {path}: {value} (expected {expected})")]
    OutOfRange {
        path: PathBuf,
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Errors from querying the repository for status or diff text.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to get git status: {0}")]
    Status(#[source] git2::Error),

    #[error("Failed to get git diff: {0}")]
    Diff(#[source] git2::Error),
}

/// Errors from a single call to an LLM provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited by {provider} (HTTP 429)")]
    RateLimited { provider: &'static str },

    #[error("{provider} rejected the credentials (HTTP {status})")]
    Unauthorized { provider: &'static str, status: u16 },

    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned an unexpected response: {source}")]
    InvalidResponse {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} returned no content")]
    EmptyResponse { provider: &'static str },
}

impl ProviderError {
    /// Whether another attempt may succeed.
    ///
    /// Rate limits, transport failures and server-side errors are transient.
    /// Authentication failures and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } | ProviderError::Transport { .. } => true,
            ProviderError::Http { status, .. } => *status >= 500 || *status == 408,
            ProviderError::Unauthorized { .. }
            | ProviderError::InvalidResponse { .. }
            | ProviderError::EmptyResponse { .. } => false,
        }
    }
}

/// Errors from commit message generation.
///
/// Never leaves the generator: every variant is converted to the fallback message.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ProviderError>),

    #[error("Model output does not follow the conventional commit format: {0:?}")]
    InvalidFormat(String),
}

/// Errors from the interactive confirmation step.
#[derive(Error, Debug)]
pub enum ConfirmError {
    #[error("Commit message cannot be empty")]
    EmptyMessage,

    #[error("Interactive prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Errors from staging and committing.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("No changes to commit. All changes may already be committed.")]
    NothingToCommit,

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Git commit failed: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error(transparent)]
    Inspect(#[from] DiffError),
}

/// Errors from pushing to the remote.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("git executable not found in PATH; push requires the git CLI")]
    GitNotInstalled,

    #[error("Cannot determine current branch (HEAD is detached or unborn). Check out a branch before pushing.")]
    NoBranch,

    #[error("No remote repository configured. Add one with: git remote add origin <url>")]
    NoRemote,

    #[error("No 'origin' remote found (configured remotes: {}). Add it with: git remote add origin <url>", .remotes.join(", "))]
    MissingOrigin { remotes: Vec<String> },

    #[error("No upstream branch set. Run: git push --set-upstream origin {branch}")]
    NoUpstream { branch: String },

    #[error("Git push failed: {0}")]
    Failed(String),

    #[error("Failed to inspect repository for push: {0}")]
    Repository(#[source] git2::Error),

    #[error("Failed to run git push: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Errors that end a run with a non-zero exit code.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Confirm(#[from] ConfirmError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Push(#[from] PushError),
}
